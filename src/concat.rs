//! The concatenation run: walk, read, write one block per file

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{ConcatError, ReadFailure};
use crate::file_utils::read_text_file;
use crate::output::{BlockWriter, OutputConfig};
use crate::tree::{FileEntry, TreeWalker, WalkerConfig};

/// Files read per parallel batch; bounds memory held between read and write.
const PARALLEL_BATCH_SIZE: usize = 64;

/// What to do when a single file cannot be read as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Write an error note in place of the content and keep going
    #[default]
    Annotate,
    /// Abort the whole run on the first failure
    FailFast,
}

/// Configuration for a concatenation run.
#[derive(Debug, Clone)]
pub struct ConcatConfig {
    pub walker: WalkerConfig,
    pub output: OutputConfig,
    pub policy: ReadPolicy,
    /// Files larger than this many bytes are treated as unreadable
    pub max_file_size: Option<u64>,
    /// Number of parallel readers.
    /// 0 = auto-detect (use all available cores)
    /// 1 = sequential (no parallelism)
    /// N = use N worker threads
    pub parallel_workers: usize,
}

impl Default for ConcatConfig {
    fn default() -> Self {
        Self {
            walker: WalkerConfig::default(),
            output: OutputConfig::default(),
            policy: ReadPolicy::default(),
            max_file_size: None,
            parallel_workers: 1,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatSummary {
    /// Files whose content was written
    pub files_written: usize,
    /// Files replaced by an error note
    pub files_annotated: usize,
    pub destination: PathBuf,
}

impl ConcatSummary {
    pub fn total_blocks(&self) -> usize {
        self.files_written + self.files_annotated
    }
}

/// Concatenate every accepted file under `root` into `destination`.
///
/// Uses the default block style and the skip-and-annotate read policy.
/// Pass `None` as `extension_filter` to include every file.
pub fn concatenate(
    root: &Path,
    destination: &Path,
    exclude_dirs: &[&str],
    extension_filter: Option<&[&str]>,
) -> Result<ConcatSummary, ConcatError> {
    let walker = WalkerConfig {
        exclude_dirs: exclude_dirs.iter().map(|s| s.to_string()).collect(),
        extensions: extension_filter.map(|exts| exts.iter().map(|s| s.to_string()).collect()),
        ..WalkerConfig::default()
    };
    Concatenator::new(ConcatConfig {
        walker,
        ..ConcatConfig::default()
    })
    .run(root, destination)
}

pub struct Concatenator {
    config: ConcatConfig,
}

impl Concatenator {
    pub fn new(config: ConcatConfig) -> Self {
        Self { config }
    }

    /// Run the concatenation, creating or truncating `destination`.
    ///
    /// The root is validated before the destination is touched, so a missing
    /// root leaves no output file behind.
    pub fn run(&self, root: &Path, destination: &Path) -> Result<ConcatSummary, ConcatError> {
        let root = resolve_root(root)?;

        let file =
            File::create(destination).map_err(|e| ConcatError::destination(destination, e))?;

        let mut walker_config = self.config.walker.clone();
        if let Ok(dest) = destination.canonicalize() {
            walker_config.skip_paths.push(dest);
        }

        let mut writer = BlockWriter::new(BufWriter::new(file), self.config.output.clone());
        let mut run = Run {
            config: &self.config,
            destination,
            files_written: 0,
            files_annotated: 0,
        };

        let entries = TreeWalker::new(walker_config).walk(&root);
        match self.pool() {
            None => run.sequential(entries, &mut writer)?,
            Some(pool) => run.parallel(entries, &mut writer, pool.as_ref())?,
        }

        let (files_written, files_annotated) = (run.files_written, run.files_annotated);
        writer
            .finish()
            .map_err(|e| ConcatError::destination(destination, e))?;

        Ok(ConcatSummary {
            files_written,
            files_annotated,
            destination: destination.to_path_buf(),
        })
    }

    /// `None` for sequential reads; `Some(None)` means use rayon's global pool.
    fn pool(&self) -> Option<Option<ThreadPool>> {
        match self.config.parallel_workers {
            1 => None,
            0 => Some(None),
            n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => Some(Some(pool)),
                Err(e) => {
                    // Fall back to rayon's global pool if custom pool creation fails
                    warn!(error = %e, "could not build thread pool, using default");
                    Some(None)
                }
            },
        }
    }
}

/// Canonicalize the root and make sure it is a directory.
fn resolve_root(root: &Path) -> Result<PathBuf, ConcatError> {
    let resolved = root.canonicalize().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConcatError::RootNotFound {
            path: root.to_path_buf(),
        },
        _ => ConcatError::RootAccess {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !resolved.is_dir() {
        return Err(ConcatError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(resolved)
}

/// Per-run state shared by the sequential and parallel paths.
struct Run<'a> {
    config: &'a ConcatConfig,
    destination: &'a Path,
    files_written: usize,
    files_annotated: usize,
}

impl Run<'_> {
    fn sequential<W: Write>(
        &mut self,
        entries: impl Iterator<Item = Result<FileEntry, ignore::Error>>,
        writer: &mut BlockWriter<W>,
    ) -> Result<(), ConcatError> {
        for entry in entries {
            let Some(entry) = self.accept(entry)? else {
                continue;
            };
            let content = read_text_file(entry.path(), self.config.max_file_size);
            self.emit(&entry, content, writer)?;
        }
        Ok(())
    }

    /// Read each batch in parallel, then write it in traversal order so the
    /// output matches a sequential run byte for byte.
    fn parallel<W: Write>(
        &mut self,
        entries: impl Iterator<Item = Result<FileEntry, ignore::Error>>,
        writer: &mut BlockWriter<W>,
        pool: Option<&ThreadPool>,
    ) -> Result<(), ConcatError> {
        let max_size = self.config.max_file_size;
        let read_batch = |batch: &[FileEntry]| -> Vec<Result<String, ReadFailure>> {
            batch
                .par_iter()
                .map(|entry| read_text_file(entry.path(), max_size))
                .collect()
        };

        let mut batch = Vec::with_capacity(PARALLEL_BATCH_SIZE);
        let mut entries = entries.peekable();
        while entries.peek().is_some() {
            batch.clear();
            while batch.len() < PARALLEL_BATCH_SIZE {
                let Some(entry) = entries.next() else {
                    break;
                };
                if let Some(entry) = self.accept(entry)? {
                    batch.push(entry);
                }
            }

            let contents = match pool {
                Some(pool) => pool.install(|| read_batch(&batch)),
                None => read_batch(&batch),
            };
            for (entry, content) in batch.iter().zip(contents) {
                self.emit(entry, content, writer)?;
            }
        }
        Ok(())
    }

    /// Unwrap a walk result, skipping unreadable directories unless failing fast.
    fn accept(
        &self,
        entry: Result<FileEntry, ignore::Error>,
    ) -> Result<Option<FileEntry>, ConcatError> {
        match entry {
            Ok(entry) => Ok(Some(entry)),
            Err(e) if self.config.policy == ReadPolicy::FailFast => Err(ConcatError::Walk(e)),
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                Ok(None)
            }
        }
    }

    fn emit<W: Write>(
        &mut self,
        entry: &FileEntry,
        content: Result<String, ReadFailure>,
        writer: &mut BlockWriter<W>,
    ) -> Result<(), ConcatError> {
        let shown = entry.display_path();
        let written = match content {
            Ok(content) => {
                debug!(path = %shown, bytes = content.len(), "read file");
                writer.write_content(&shown, &content).map(|()| {
                    info!(path = %shown, "added");
                    self.files_written += 1;
                })
            }
            Err(failure) if self.config.policy == ReadPolicy::FailFast => {
                return Err(ConcatError::FileRead {
                    path: entry.path().to_path_buf(),
                    source: failure,
                });
            }
            Err(failure) => {
                warn!(path = %shown, error = %failure, "could not read file, annotating");
                writer.write_error(&shown, &failure).map(|()| {
                    self.files_annotated += 1;
                })
            }
        };
        written.map_err(|e| ConcatError::destination(self.destination, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::BlockStyle;
    use crate::test_utils::TestTree;
    use std::fs;
    use tempfile::TempDir;

    fn dashed() -> ConcatConfig {
        ConcatConfig {
            output: OutputConfig {
                style: BlockStyle::Dashed,
                ..OutputConfig::default()
            },
            ..ConcatConfig::default()
        }
    }

    #[test]
    fn test_concatenate_dashed() {
        let tree = TestTree::new();
        tree.add_file("a.ts", "let a;");
        tree.add_file("dir/b.ts", "let b;");
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        let summary = Concatenator::new(dashed()).run(tree.path(), &dest).unwrap();

        assert_eq!(summary.files_written, 2);
        assert_eq!(summary.files_annotated, 0);
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "--- a.ts ---\nlet a;\n\n--- dir/b.ts ---\nlet b;\n\n"
        );
    }

    #[test]
    fn test_concatenate_function_filters() {
        let tree = TestTree::new();
        tree.add_file("a/b/c.json", "{}");
        tree.add_file("a/b/d.ts", "export const d = 4;\n");
        tree.add_file("vendor/x.ts", "vendored");
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        let summary =
            concatenate(tree.path(), &dest, &["vendor"], Some(&[".ts", ".tsx"][..])).unwrap();

        assert_eq!(summary.files_written, 1);
        let output = fs::read_to_string(&dest).unwrap();
        assert!(output.contains("// Path: a/b/d.ts\n\nexport const d = 4;\n"));
        assert!(!output.contains("c.json"));
        assert!(!output.contains("vendored"));
    }

    #[test]
    fn test_missing_root_writes_nothing() {
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        let err = Concatenator::new(ConcatConfig::default())
            .run(&out_dir.path().join("missing"), &dest)
            .unwrap_err();

        assert!(matches!(err, ConcatError::RootNotFound { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_root_is_file() {
        let tree = TestTree::new();
        let file = tree.add_file("file.ts", "x");
        let dest = tree.path().join("out.txt");

        let err = Concatenator::new(ConcatConfig::default())
            .run(&file, &dest)
            .unwrap_err();
        assert!(matches!(err, ConcatError::NotADirectory { .. }));
    }

    #[test]
    fn test_unwritable_destination() {
        let tree = TestTree::new();
        tree.add_file("a.ts", "x");
        let dest = tree.path().join("no/such/dir/out.txt");

        let err = Concatenator::new(ConcatConfig::default())
            .run(tree.path(), &dest)
            .unwrap_err();
        assert!(matches!(err, ConcatError::Destination { .. }));
    }

    #[test]
    fn test_empty_tree_creates_empty_file() {
        let tree = TestTree::new();
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        let summary = Concatenator::new(ConcatConfig::default())
            .run(tree.path(), &dest)
            .unwrap();

        assert_eq!(summary.total_blocks(), 0);
        assert!(dest.exists());
        assert_eq!(fs::read(&dest).unwrap().len(), 0);
    }

    #[test]
    fn test_annotate_invalid_utf8() {
        let tree = TestTree::new();
        tree.add_bytes("logo.png", &[0x89, b'P', b'N', b'G', 0xff]);
        tree.add_file("main.ts", "main();");
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        let summary = Concatenator::new(dashed()).run(tree.path(), &dest).unwrap();

        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.files_annotated, 1);
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "--- logo.png ---\n(error reading file: not valid UTF-8 text)\n\n\
             --- main.ts ---\nmain();\n\n"
        );
    }

    #[test]
    fn test_fail_fast_aborts() {
        let tree = TestTree::new();
        tree.add_bytes("logo.png", &[0xff, 0xfe]);
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        let config = ConcatConfig {
            policy: ReadPolicy::FailFast,
            ..ConcatConfig::default()
        };
        let err = Concatenator::new(config).run(tree.path(), &dest).unwrap_err();
        assert!(matches!(
            err,
            ConcatError::FileRead {
                source: ReadFailure::InvalidUtf8,
                ..
            }
        ));
    }

    #[test]
    fn test_max_file_size_annotates() {
        let tree = TestTree::new();
        tree.add_file("big.ts", "0123456789");
        tree.add_file("small.ts", "01");
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        let config = ConcatConfig {
            max_file_size: Some(5),
            ..dashed()
        };
        let summary = Concatenator::new(config).run(tree.path(), &dest).unwrap();

        assert_eq!(summary.files_annotated, 1);
        let output = fs::read_to_string(&dest).unwrap();
        assert!(output.contains("--- big.ts ---\n(error reading file: file is 10 bytes, limit is 5)"));
        assert!(output.contains("--- small.ts ---\n01\n\n"));
    }

    #[test]
    fn test_destination_inside_root_is_idempotent() {
        let tree = TestTree::new();
        tree.add_file("a.ts", "let a;");
        tree.add_file("b.ts", "let b;");
        let dest = tree.path().join("combined.txt");

        let concat = Concatenator::new(ConcatConfig::default());
        let first_summary = concat.run(tree.path(), &dest).unwrap();
        let first = fs::read(&dest).unwrap();
        let second_summary = concat.run(tree.path(), &dest).unwrap();
        let second = fs::read(&dest).unwrap();

        assert_eq!(first_summary.files_written, 2);
        assert_eq!(second_summary.files_written, 2);
        assert_eq!(first, second);
        assert!(!String::from_utf8(second).unwrap().contains("combined.txt"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let tree = TestTree::new();
        for i in 0..150 {
            tree.add_file(&format!("dir{}/file{:03}.ts", i % 7, i), &format!("// {}\n", i));
        }
        tree.add_bytes("dir3/blob.bin", &[0xff; 8]);
        let out_dir = TempDir::new().unwrap();

        let sequential = out_dir.path().join("seq.txt");
        Concatenator::new(ConcatConfig::default())
            .run(tree.path(), &sequential)
            .unwrap();

        for workers in [0, 4] {
            let parallel = out_dir.path().join(format!("par{}.txt", workers));
            let config = ConcatConfig {
                parallel_workers: workers,
                ..ConcatConfig::default()
            };
            let summary = Concatenator::new(config).run(tree.path(), &parallel).unwrap();
            assert_eq!(summary.files_written, 150);
            assert_eq!(summary.files_annotated, 1);
            assert_eq!(fs::read(&sequential).unwrap(), fs::read(&parallel).unwrap());
        }
    }

    #[test]
    fn test_fail_fast_aborts_parallel() {
        let tree = TestTree::new();
        for i in 0..10 {
            tree.add_file(&format!("file{}.ts", i), "ok");
        }
        tree.add_bytes("file5.bin", &[0xff, 0xfe]);
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        let config = ConcatConfig {
            policy: ReadPolicy::FailFast,
            parallel_workers: 4,
            ..ConcatConfig::default()
        };
        let err = Concatenator::new(config).run(tree.path(), &dest).unwrap_err();
        match err {
            ConcatError::FileRead { path, source } => {
                assert!(path.ends_with("file5.bin"));
                assert!(matches!(source, ReadFailure::InvalidUtf8));
            }
            other => panic!("expected FileRead, got {:?}", other),
        }
    }

    #[test]
    fn test_root_access_error_keeps_cause() {
        let tree = TestTree::new();
        let file = tree.add_file("file.ts", "x");
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        // A path through a regular file fails with "not a directory", not "not found"
        let err = Concatenator::new(ConcatConfig::default())
            .run(&file.join("sub"), &dest)
            .unwrap_err();

        match err {
            ConcatError::RootAccess { source, .. } => {
                assert_ne!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected RootAccess, got {:?}", other),
        }
        assert!(!dest.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_markers_unique_for_unusual_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tree = TestTree::new();
        fs::write(tree.root().join(OsStr::from_bytes(b"a\xfe.ts")), "one").unwrap();
        fs::write(tree.root().join(OsStr::from_bytes(b"a\xff.ts")), "two").unwrap();
        fs::write(tree.root().join("evil\n--- fake.ts ---"), "real").unwrap();
        let out_dir = TempDir::new().unwrap();
        let dest = out_dir.path().join("all.txt");

        let summary = Concatenator::new(dashed()).run(tree.path(), &dest).unwrap();
        assert_eq!(summary.files_written, 3);

        let output = fs::read_to_string(&dest).unwrap();
        assert_eq!(
            output,
            "--- a\\xfe.ts ---\none\n\n\
             --- a\\xff.ts ---\ntwo\n\n\
             --- evil\\n--- fake.ts --- ---\nreal\n\n"
        );
        assert!(!output.lines().any(|line| line == "--- fake.ts ---"));
        let markers: Vec<_> = output.lines().filter(|l| l.starts_with("--- ")).collect();
        assert_eq!(markers.len(), 3);
    }
}
