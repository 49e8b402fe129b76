use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use preflight_copilot::checklist::{self, Checklist};
use preflight_copilot::color::Painter;
use preflight_copilot::config::{self, CHECKLIST_ENV, TELEMETRY_ENV};
use preflight_copilot::state::{ChecklistSession, SessionStatus};
use preflight_copilot::ui::report;
use preflight_copilot::validate::TelemetryValidator;

#[derive(Parser)]
#[command(name = "preflight-copilot")]
#[command(about = "Validate a pre-flight checklist against recorded flight telemetry", long_about = None)]
#[command(version)]
struct Cli {
    /// Telemetry log (.csv, .json or .parquet).
    #[arg(long, env = TELEMETRY_ENV, global = true, default_value = "flight_data.csv")]
    telemetry: PathBuf,

    /// Checklist JSON; the built-in checklist is used when the file is missing.
    #[arg(long, env = CHECKLIST_ENV, global = true)]
    checklist: Option<PathBuf>,

    /// JSON file overriding the pre-flight filter thresholds.
    #[arg(long, global = true)]
    thresholds: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Plain, global = true)]
    format: Format,

    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show row counts and the reference row chosen for validation.
    Inspect,

    /// Validate one step, or every step independently.
    Validate {
        #[arg(long)]
        step: Option<String>,
    },

    /// Step through the checklist, stopping at the first warning or failure.
    Run {
        #[arg(long)]
        continue_on_error: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let thresholds = config::load_thresholds(cli.thresholds.as_deref())?;
    let validator = TelemetryValidator::open(&cli.telemetry, thresholds);
    let painter = Painter::for_stdout();

    match cli.command {
        Commands::Inspect => {
            match cli.format {
                Format::Plain => print!("{}", report::telemetry(&painter, &validator)),
                Format::Json => {
                    let value = serde_json::json!({
                        "total_rows": validator.total_rows(),
                        "rows_loaded": validator.row_count(),
                        "reference_row": validator.reference_row().map(|r| &r.cells),
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate { step } => {
            let checklist = load_checklist(cli.checklist)?;
            let steps: Vec<_> = match &step {
                Some(id) => match checklist.get(id) {
                    Some(s) => vec![s],
                    None => bail!("Step {id} not found"),
                },
                None => checklist.steps().iter().collect(),
            };

            let mut blocking = false;
            let mut results = Vec::new();
            for s in steps {
                let outcome = validator.validate(s, None);
                blocking |= outcome.status.is_blocking();
                match cli.format {
                    Format::Plain => print!("{}", report::outcome(&painter, s, &outcome)),
                    Format::Json => results.push(serde_json::json!({
                        "step_id": s.step_id,
                        "name": s.name,
                        "outcome": outcome,
                    })),
                }
            }
            if cli.format == Format::Json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            Ok(if blocking { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }

        Commands::Run { continue_on_error } => {
            let checklist = load_checklist(cli.checklist)?;
            let mut session =
                ChecklistSession::new(checklist).with_continue_on_error(continue_on_error);

            if cli.format == Format::Plain {
                print!("{}", report::telemetry(&painter, &validator));
                println!();
            }

            let results = session.run_to_end(&validator);
            let summary = session.complete();
            match cli.format {
                Format::Plain => {
                    for (step_id, outcome) in &results {
                        if let Some(step) = session.checklist().get(step_id) {
                            print!("{}", report::outcome(&painter, step, outcome));
                        }
                    }
                    println!();
                    print!("{}", report::summary(&painter, &summary));
                }
                Format::Json => {
                    let value = serde_json::json!({
                        "status": session.status(),
                        "steps": results
                            .iter()
                            .map(|(id, o)| serde_json::json!({ "step_id": id, "outcome": o }))
                            .collect::<Vec<_>>(),
                        "summary": summary,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
            }
            Ok(match session.status() {
                SessionStatus::Blocked => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            })
        }
    }
}

fn load_checklist(path: Option<PathBuf>) -> Result<Checklist> {
    checklist::load_checklist_or_fallback(path.as_deref()).context("loading checklist")
}
