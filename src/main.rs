//! askcars - ask a used cars database questions in plain language.

use std::process::ExitCode;

use serde::Serialize;
use tracing::{error, info};

use askcars::cli::{Cli, Command};
use askcars::config::Config;
use askcars::db::SqliteStore;
use askcars::error::{AskError, Result};
use askcars::llm::{create_client, LlmSynthesizer};
use askcars::logging;
use askcars::pipeline::{check_question, Aborted, Pipeline, QueryAnswer};
use askcars::safety::SafetyVerdict;

/// Exit code for configuration errors.
const EXIT_CONFIG: u8 = 1;
/// Exit code for aborted requests and refused dry runs.
const EXIT_ABORTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    logging::init_stderr_logging();

    let cli = Cli::parse_args();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}: {}", e.category(), e.message());
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let store = SqliteStore::new(&config.database.path);
    info!("Database: {}", store.path().display());

    match &cli.command {
        Command::Query { sql } => {
            let pipeline = Pipeline::without_synthesizer(store);
            let outcome = pipeline.run_sql(sql).await;
            print_outcome(outcome, cli.pretty)
        }
        Command::Ask { question, dry_run } => {
            if let Err(aborted) = check_question(question) {
                return print_outcome(Err(aborted), cli.pretty);
            }

            info!("LLM provider: {}", config.llm.provider);
            let client = create_client(&config.llm)?;
            let pipeline = Pipeline::new(LlmSynthesizer::new(client), store);

            if *dry_run {
                match pipeline.translate(question).await {
                    Ok(verdict) => print_dry_run(&verdict, cli.pretty),
                    Err(aborted) => print_outcome(Err(aborted), cli.pretty),
                }
            } else {
                let outcome = pipeline.run(question).await;
                print_outcome(outcome, cli.pretty)
            }
        }
    }
}

/// Loads configuration with precedence:
/// 1. CLI arguments (highest)
/// 2. `ASKCARS_*` environment variables
/// 3. Config file
fn load_config(cli: &Cli) -> Result<Config> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());

    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides();
    cli.apply_overrides(&mut config);
    Ok(config)
}

/// Prints the outbound JSON for a finished request.
fn print_outcome(
    outcome: std::result::Result<QueryAnswer, Aborted>,
    pretty: bool,
) -> Result<ExitCode> {
    match outcome {
        Ok(answer) => {
            print_json(&answer, pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(aborted) => {
            error!(
                status = %aborted.status_hint(),
                stage = %aborted.stage,
                "Request aborted: {}",
                aborted.message
            );
            print_json(&aborted.to_response(), pretty)?;
            Ok(ExitCode::from(EXIT_ABORTED))
        }
    }
}

/// Dry-run report: the generated SQL and whether the gate would let it run.
#[derive(Debug, Serialize)]
struct DryRunReport<'a> {
    sql: &'a str,
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn print_dry_run(verdict: &SafetyVerdict, pretty: bool) -> Result<ExitCode> {
    let report = DryRunReport {
        sql: verdict.statement_text(),
        accepted: verdict.is_accepted(),
        reason: match verdict {
            SafetyVerdict::Accepted(_) => None,
            SafetyVerdict::Rejected(rejection) => Some(rejection.reason.to_string()),
        },
    };
    print_json(&report, pretty)?;

    Ok(if report.accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_ABORTED)
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| AskError::internal(format!("Failed to serialize output: {e}")))?;

    println!("{json}");
    Ok(())
}
