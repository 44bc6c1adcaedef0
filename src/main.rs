use anyhow::Context;
use clap::Parser;
use fxbot::config::{BotConfig, TradingEnvironment};
use fxbot::{BotError, CycleOutcome, DecisionCycle, OandaClient};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Run one FX decision cycle against OANDA and exit.
///
/// Settings come from `OANDA_*` environment variables (a `.env` file is
/// honoured); flags override them for this run.
#[derive(Parser, Debug)]
#[command(name = "fxbot", version, about)]
struct Cli {
    /// Instrument symbol, e.g. EUR_USD
    #[arg(long)]
    instrument: Option<String>,

    /// Candle granularity, e.g. M5
    #[arg(long)]
    granularity: Option<String>,

    /// Units per trade
    #[arg(long)]
    trade_size: Option<u64>,

    /// practice or live
    #[arg(long)]
    environment: Option<TradingEnvironment>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    tracing::info!("Running bot check at {}", chrono::Utc::now().to_rfc3339());

    match run(cli).await {
        Ok(outcome) => {
            log_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err
                .downcast_ref::<BotError>()
                .map(BotError::exit_code)
                .unwrap_or(1);
            tracing::error!(exit_code = code, "Decision cycle aborted: {:#}", err);
            ExitCode::from(code)
        }
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fxbot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> anyhow::Result<CycleOutcome> {
    let mut config = BotConfig::from_env()?;
    apply_overrides(&mut config, cli);
    config.validate_settings()?;

    // Fails before any client exists if credentials are missing
    let credentials = config.credentials()?;

    tracing::info!(
        environment = ?config.environment,
        instrument = %config.instrument,
        granularity = %config.granularity,
        trade_size = config.trade_size,
        "Configuration loaded"
    );

    let client = OandaClient::new(&credentials, config.environment)
        .context("Failed to build OANDA HTTP client")?;

    let cycle = DecisionCycle::new(config, client.clone(), client);
    let outcome = cycle.run().await?;

    Ok(outcome)
}

fn apply_overrides(config: &mut BotConfig, cli: Cli) {
    if let Some(instrument) = cli.instrument {
        config.instrument = instrument;
    }
    if let Some(granularity) = cli.granularity {
        config.granularity = granularity;
    }
    if let Some(trade_size) = cli.trade_size {
        config.trade_size = trade_size;
    }
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }
}

fn log_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::PositionAlreadyOpen { .. } => {
            tracing::info!(outcome = "position_open", "Cycle complete");
        }
        CycleOutcome::NoSignal => {
            tracing::info!(outcome = "no_signal", "Cycle complete");
        }
        CycleOutcome::TradePlaced(report) => {
            tracing::info!(
                outcome = "trade_placed",
                direction = %report.direction,
                order_id = %report.receipt.order_id,
                "Cycle complete"
            );
        }
        CycleOutcome::TradeFailed { direction, error, .. } => {
            tracing::warn!(
                outcome = "trade_failed",
                %direction,
                error = %error,
                "Cycle complete"
            );
        }
    }
}
