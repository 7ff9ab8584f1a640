//! Interactive MYCIN consultation.
//!
//! Runs the bundled bacteremia knowledge base over stdin/stdout. Set
//! `RUST_LOG=emycin=debug` to watch rules fire.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use emycin::{mycin, ConsoleAsker, EmycinError, EngineConfig, Session};

struct Args {
    /// Optional JSON engine configuration
    config: Option<PathBuf>,
    /// Emit findings as JSON instead of text
    json: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        config: None,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("error: --config requires a value");
                    std::process::exit(1);
                }
            }
            "--json" => {
                parsed.json = true;
                i += 1;
            }
            "--help" | "-h" => {
                println!("mycin - rule-based consultation with certainty factors");
                println!();
                println!("USAGE:");
                println!("    mycin [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -c, --config <FILE>    JSON engine configuration");
                println!("        --json             Print findings as JSON");
                println!("    -h, --help             Print help information");
                println!();
                println!("While answering: ? lists legal replies, why explains the");
                println!("question, rule shows the active rule, unknown skips it.");
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    parsed
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, EmycinError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        EmycinError::internal(format!("cannot read {}: {e}", path.display()))
    })?;
    Ok(EngineConfig::from_json(&text)?)
}

fn consult(args: &Args) -> Result<(), EmycinError> {
    let config = load_config(args.config.as_ref())?;
    let kb = mycin::knowledge_base()?;

    let stdin = io::stdin();
    let asker = ConsoleAsker::new(stdin.lock(), io::stdout());
    let mut session = Session::with_config(&kb, asker, config);

    let report = session.run(&mycin::CONTEXTS)?;
    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| EmycinError::internal(e.to_string()))?;
        println!("{json}");
    } else {
        for findings in &report {
            print!("{findings}");
        }
    }
    tracing::info!(stats = ?session.stats(), "done");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = parse_args();
    match consult(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
