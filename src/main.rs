//! CLI entry point for find-imports

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use find_imports::{
    EnvironmentConfig, OutputFormat, PythonEnvironment, PythonVersion, ScanConfig, ScanResult,
    Scanner, print_items,
};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "find-imports")]
#[command(about = "List the third-party packages a Python file or package imports")]
#[command(version)]
struct Args {
    /// Python file or package directory to scan
    path: PathBuf,

    /// Print installed versions as name==version
    #[arg(long = "versions")]
    versions: bool,

    /// Output in JSON format
    #[arg(long = "json")]
    json: bool,

    /// Print every imported name without filtering the standard library
    #[arg(short = 'a', long = "all", conflicts_with = "versions")]
    all: bool,

    /// Skip hidden files and paths excluded by .gitignore
    #[arg(long = "gitignore")]
    gitignore: bool,

    /// Skip files or directories matching pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Python interpreter to inspect for installed packages
    #[arg(long = "python", value_name = "PATH")]
    python: Option<PathBuf>,

    /// Site-packages directory to search (can be used multiple times)
    #[arg(long = "site-packages", value_name = "DIR")]
    site_packages: Vec<PathBuf>,

    /// Standard library directory of the target runtime
    #[arg(long = "stdlib", value_name = "DIR")]
    stdlib: Option<PathBuf>,

    /// Target Python version for the standard library manifest (e.g. 3.12)
    #[arg(long = "python-version", value_name = "X.Y")]
    python_version: Option<PythonVersion>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            respect_gitignore: self.gitignore,
            ignore_patterns: self.ignore.clone(),
        }
    }

    fn environment_config(&self) -> EnvironmentConfig {
        EnvironmentConfig {
            python: self.python.clone(),
            site_packages: self.site_packages.clone(),
            stdlib: self.stdlib.clone(),
            python_version: self.python_version,
            isolated: false,
        }
    }

    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        }
    }
}

/// Initialize tracing subscriber. `RUST_LOG` takes precedence over flags.
fn init_tracing(level: Level) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> ScanResult<io::Result<()>> {
    let env = PythonEnvironment::discover(&args.environment_config());
    let scanner = Scanner::new(args.scan_config(), env);
    let format = args.output_format();

    let printed = if args.all {
        print_items(&scanner.extract(&args.path)?, format)
    } else if args.versions {
        print_items(&scanner.find_imports_and_installed_versions(&args.path)?, format)
    } else {
        print_items(&scanner.find_imports(&args.path)?, format)
    };
    Ok(printed)
}

fn main() {
    let args = Args::parse();
    init_tracing(args.log_level());

    match run(&args) {
        Ok(Ok(())) => {}
        Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
        Ok(Err(e)) => {
            eprintln!("find-imports: error writing output: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("find-imports: {}", e);
            process::exit(1);
        }
    }
}
