mod session;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use intake_core::{person, run_submit, validate, FieldValues, SubmitOutcome};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Intake conditional form demo.
#[derive(Parser)]
#[command(name = "intake", version, about = "Intake conditional form demo")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive form session
    Run,

    /// Validate a JSON value set against the person schema
    Validate {
        /// Path to the values JSON file
        #[arg(long)]
        values: PathBuf,
    },

    /// Run the submission flow over a JSON value set
    Submit {
        /// Path to the values JSON file
        #[arg(long)]
        values: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            process::exit(session::run(cli.quiet));
        }
        Commands::Validate { values } => {
            cmd_validate(&values, cli.output, cli.quiet);
        }
        Commands::Submit { values } => {
            cmd_submit(&values, cli.output, cli.quiet);
        }
    }
}

/// Read and parse a values JSON file (an object of string fields).
fn read_values(path: &Path, output: OutputFormat, quiet: bool) -> FieldValues {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_validate(values_path: &Path, output: OutputFormat, quiet: bool) {
    let values = read_values(values_path, output, quiet);

    match validate(&values, &person::schema()) {
        Ok(errors) if errors.is_valid() => {
            if !quiet {
                match output {
                    OutputFormat::Text => println!("valid"),
                    OutputFormat::Json => println!("{{\"valid\": true}}"),
                }
            }
        }
        Ok(errors) => {
            match output {
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!("invalid values");
                        for (field, message) in &errors.0 {
                            eprintln!("  - {}: {}", field, message);
                        }
                    }
                }
                OutputFormat::Json => {
                    if !quiet {
                        let json = serde_json::json!({
                            "valid": false,
                            "errors": errors.to_json(),
                        });
                        eprintln!(
                            "{}",
                            serde_json::to_string_pretty(&json).unwrap_or_default()
                        );
                    }
                }
            }
            process::exit(1);
        }
        Err(e) => {
            let msg = format!("schema error: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_submit(values_path: &Path, output: OutputFormat, quiet: bool) {
    let values = read_values(values_path, output, quiet);

    let mut payload = None;
    let result = match run_submit(&values, &person::schema(), |emitted| {
        payload = Some(emitted)
    }) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!("schema error: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    match result.outcome {
        SubmitOutcome::Submitted => {
            let payload = payload.unwrap_or(serde_json::Value::Null);
            if !quiet {
                match output {
                    OutputFormat::Text => {
                        match serde_json::to_string_pretty(&payload) {
                            Ok(pretty) => println!("{}", pretty),
                            Err(e) => eprintln!("serialization error: {}", e),
                        }
                        println!("submitted");
                    }
                    OutputFormat::Json => {
                        let json = serde_json::json!({
                            "submitted": true,
                            "values": payload,
                        });
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json).unwrap_or_default()
                        );
                    }
                }
            }
        }
        SubmitOutcome::Rejected => {
            match output {
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!("rejected: {} error(s)", result.errors.len());
                        for (field, message) in &result.errors.0 {
                            eprintln!("  - {}: {}", field, message);
                        }
                    }
                }
                OutputFormat::Json => {
                    if !quiet {
                        let json = serde_json::json!({
                            "submitted": false,
                            "errors": result.errors.to_json(),
                        });
                        eprintln!(
                            "{}",
                            serde_json::to_string_pretty(&json).unwrap_or_default()
                        );
                    }
                }
            }
            process::exit(1);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}
