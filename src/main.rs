//! CLI entry point for treecat

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use treecat::{
    BlockStyle, ConcatConfig, Concatenator, DEFAULT_EXCLUDED_DIRS, OutputConfig, ReadPolicy,
    WalkerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "treecat")]
#[command(about = "Concatenate every file under a directory into one file, each preceded by its path")]
#[command(version)]
struct Args {
    /// Directory to walk
    root: PathBuf,

    /// File to write the combined output to
    #[arg(short, long, default_value = "combined.txt")]
    output: PathBuf,

    /// Skip directories with this name or glob pattern (can be used multiple times)
    #[arg(short = 'x', long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,

    /// Don't skip node_modules by default
    #[arg(long = "no-default-excludes")]
    no_default_excludes: bool,

    /// Only include files with these extensions (e.g. -e ts,tsx)
    #[arg(short = 'e', long = "ext", value_name = "EXT", value_delimiter = ',')]
    extensions: Vec<String>,

    /// Layout of each file block
    #[arg(long = "style", value_name = "STYLE", default_value = "banner")]
    style: BlockStyle,

    /// Text preceding the path on marker lines (banner style)
    #[arg(long = "marker", value_name = "PREFIX")]
    marker: Option<String>,

    /// Character used for the separator rule (banner style)
    #[arg(long = "rule-char", value_name = "CHAR")]
    rule_char: Option<char>,

    /// Width of the separator rule (banner style)
    #[arg(long = "rule-width", value_name = "N")]
    rule_width: Option<usize>,

    /// Abort on the first file that can't be read as text
    /// (default: write an error note in its place and continue)
    #[arg(long = "strict")]
    strict: bool,

    /// Treat files larger than this many bytes as unreadable
    #[arg(long = "max-size", value_name = "BYTES")]
    max_size: Option<u64>,

    /// Respect .gitignore and .ignore files
    #[arg(long = "gitignore")]
    gitignore: bool,

    /// Number of parallel readers
    /// (0 = auto-detect, 1 = sequential, N = use N workers)
    #[arg(short = 'j', long = "jobs", default_value = "1")]
    jobs: usize,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    fn into_config(self) -> (PathBuf, PathBuf, ConcatConfig) {
        let mut exclude_dirs: Vec<String> = if self.no_default_excludes {
            Vec::new()
        } else {
            DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
        };
        exclude_dirs.extend(self.exclude);

        let walker = WalkerConfig {
            exclude_dirs,
            extensions: if self.extensions.is_empty() {
                None
            } else {
                Some(self.extensions)
            },
            respect_ignore_files: self.gitignore,
            skip_paths: Vec::new(),
        };

        let defaults = OutputConfig::default();
        let output = OutputConfig {
            style: self.style,
            marker: self.marker.unwrap_or(defaults.marker),
            rule_char: self.rule_char.unwrap_or(defaults.rule_char),
            rule_width: self.rule_width.unwrap_or(defaults.rule_width),
        };

        let config = ConcatConfig {
            walker,
            output,
            policy: if self.strict {
                ReadPolicy::FailFast
            } else {
                ReadPolicy::Annotate
            },
            max_file_size: self.max_size,
            parallel_workers: self.jobs,
        };

        (self.root, self.output, config)
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.log_level());

    let (root, output, config) = args.into_config();
    match Concatenator::new(config).run(&root, &output) {
        Ok(summary) => {
            if summary.files_annotated > 0 {
                println!(
                    "Combined {} file(s) into {} ({} unreadable, see notes)",
                    summary.total_blocks(),
                    summary.destination.display(),
                    summary.files_annotated
                );
            } else {
                println!(
                    "Combined {} file(s) into {}",
                    summary.total_blocks(),
                    summary.destination.display()
                );
            }
        }
        Err(e) => {
            eprintln!("treecat: {}", e);
            process::exit(1);
        }
    }
}
