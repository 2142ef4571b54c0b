//! tinfer - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use tinfer::frontend::core::type_system::Aliases;
use tinfer::frontend::typecheck::ascription::parse_type;
use tinfer::util::config::Config;
use tinfer::util::diagnostic::{check_paths, EmitterConfig, JsonEmitter, TextEmitter};
use tinfer::util::logger::{self, LogLevel};
use tinfer::{NAME, VERSION};

/// Structural type inference for JavaScript-style programs (ESTree JSON input)
#[derive(Parser, Debug)]
#[command(name = "tinfer")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Infer and check the types of ESTree JSON programs
    Check {
        /// Files or directories to check
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Stop at the first type error
        #[arg(long)]
        fail_fast: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Maximum nesting of call-site instantiation
        #[arg(long, value_name = "N")]
        max_call_depth: Option<usize>,
    },

    /// Parse a type expression and print it back
    PrintType {
        /// Type expression, e.g. "Function([Number], String)"
        #[arg(value_name = "TYPE")]
        source: String,
    },

    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let mut config = Config::discover(&cwd).context("Failed to load tinfer.toml")?;
    config
        .apply_env()
        .context("Invalid TINFER_* environment variable")?;

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log.level()
    };
    logger::init_with_level(level);

    match args.command {
        Commands::Check {
            paths,
            fail_fast,
            format,
            max_call_depth,
        } => {
            if fail_fast {
                config.check.fail_fast = true;
            }
            if let Some(depth) = max_call_depth {
                config.check.max_call_depth = depth;
            }

            let reports = check_paths(&paths, &config)?;
            match format {
                Format::Json => println!("{}", JsonEmitter::render_all(&reports)),
                Format::Text => {
                    let emitter = TextEmitter::with_config(EmitterConfig {
                        use_colors: std::io::stdout().is_terminal(),
                        show_bindings: true,
                        show_file: reports.len() > 1,
                    });
                    for report in &reports {
                        print!("{}", emitter.render(report));
                    }
                }
            }

            let failed = reports.iter().filter(|r| r.has_errors()).count();
            if failed > 0 {
                if args.verbose {
                    eprintln!("{} of {} file(s) have type errors", failed, reports.len());
                }
                std::process::exit(1);
            }
        }
        Commands::PrintType { source } => {
            let ty = parse_type(&source, &Aliases::new())
                .with_context(|| format!("Failed to parse type: {}", source))?;
            println!("{}", ty);
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}
