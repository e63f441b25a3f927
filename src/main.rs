use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use installment::{
    analytics::{Analytics, TracingAnalytics},
    compute_annual_service_fee, compute_monthly_payment, is_amount_valid, logging,
    money::{format_money, format_money_precise},
    storage::FileFlagStore,
    submission::HttpSubmission,
    ui, Funnel, FunnelConfig, NavigationToken, Term,
};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Installment calculator: pick an amount and a term, confirm, apply.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// TOML file with deployment parameters.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the completion flag and the log file.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Product ceiling, overriding the config file.
    #[arg(long, global = true)]
    max_amount: Option<i64>,

    /// Variant label reported with submissions.
    #[arg(long)]
    variant: Option<String>,

    /// Collector URL that receives submissions.
    #[arg(long)]
    endpoint: Option<String>,

    /// Do not emit analytics events.
    #[arg(long)]
    no_analytics: bool,

    /// Navigation token to open on: empty, `confirm` or `success`.
    #[arg(long, default_value = "")]
    screen: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the monthly payment and service fee without starting the UI.
    Quote {
        #[arg(long)]
        amount: i64,

        /// Term in months: 3, 6, 9 or 12.
        #[arg(long, default_value_t = 12)]
        term: u32,
    },
}

// ─── configuration ───────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> Result<FunnelConfig> {
    let mut config = match &cli.config {
        Some(path) => FunnelConfig::load(path)?,
        None => FunnelConfig::default(),
    };
    if let Some(max_amount) = cli.max_amount {
        config.max_amount = max_amount;
    }
    if let Some(variant) = &cli.variant {
        config.variant = variant.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.submission_endpoint = Some(endpoint.clone());
    }
    if cli.no_analytics {
        config.analytics = false;
    }
    config.validate()?;
    Ok(config)
}

fn state_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.state_dir {
        Some(dir) => Ok(dir.clone()),
        None => dirs::data_local_dir()
            .map(|dir| dir.join("installment"))
            .context("no local data directory; pass --state-dir"),
    }
}

// ─── commands ────────────────────────────────────────────────────────────────

fn quote(config: &FunnelConfig, amount: i64, term: u32) -> Result<()> {
    let term = Term::try_from(term)?;
    if !is_amount_valid(&amount.to_string(), config.min_amount, config.max_amount) {
        bail!(
            "amount must be between {} and {}",
            config.min_amount,
            config.max_amount
        );
    }

    let symbol = config.currency_symbol.as_str();
    let payment = compute_monthly_payment(amount as f64, term, config.rate);
    let fee = compute_annual_service_fee(amount as f64, term, config.rate);
    debug!(amount, term = term.months(), payment, fee, "quoted");

    println!("Amount:          {}", format_money(amount as f64, symbol));
    println!("Term:            {} months", term.months());
    println!("Monthly payment: {}", format_money(payment, symbol));
    println!("Service fee:     {}", format_money_precise(fee, symbol));
    Ok(())
}

fn run_funnel(cli: &Cli, config: FunnelConfig) -> Result<()> {
    let dir = state_dir(cli)?;
    logging::init_file(&dir)?;
    info!(variant = %config.variant, max_amount = config.max_amount, "session started");

    let store = FileFlagStore::in_dir(&dir);
    let analytics = if config.analytics {
        Analytics::new(Box::new(TracingAnalytics))
    } else {
        Analytics::disabled()
    };
    let submission = config.submission_endpoint.clone().map(|endpoint| {
        HttpSubmission::new(endpoint, Duration::from_secs(config.submission_timeout_secs))
    });

    let mut funnel = Funnel::new(config, store)
        .with_analytics(analytics)
        .with_initial_token(NavigationToken::parse(&cli.screen));
    if let Some(sink) = submission {
        funnel = funnel.with_submission(Box::new(sink));
    }

    ui::run(&mut funnel)
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Some(Command::Quote { amount, term }) => {
            logging::init_stderr();
            quote(&config, *amount, *term)
        }
        None => run_funnel(&cli, config),
    }
}
