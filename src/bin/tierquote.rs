//! CLI binary for tierquote.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PricingConfig`, prints the tier catalog and the custom estimate, and
//! annotates prices with the stablecoin rate when it arrives in time.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;
use tierquote::input::{self, InputPhase, VolumeField};
use tierquote::{
    format, BillingPeriod, Decimal, Estimator, Price, PricingConfig, PricingQuote, PricingTier,
    RateState, RateValue,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Catalog plus an estimate for 1,000 requests/day
  tierquote

  # Estimate for 12,345 requests/day, snapped to the 500 step (12,500)
  tierquote --daily 12345 --snap

  # Enter a monthly figure instead of a daily one
  tierquote --monthly 450000

  # Annual billing (15% off twelve months)
  tierquote --daily 50000 --billing annual

  # Skip the exchange-rate lookup entirely
  tierquote --offline

  # Machine-readable output
  tierquote --daily 50000 --json

PRICING RULES:
  Monthly volume = daily volume × 30. The whole month is charged at the rate
  of the first bracket that covers it, rounded to whole rupees, never below
  the floor (₹49). Above 30,000,000 requests/month: contact sales.

EXCHANGE RATE:
  One request to the rate source at startup. If it fails, times out, or
  returns something unexpected, USDT figures show "—" and prices are
  unaffected.

ENVIRONMENT VARIABLES:
  TIERQUOTE_DAILY           Daily request volume
  TIERQUOTE_BILLING         monthly | annual
  TIERQUOTE_RATE_ENDPOINT   Rate API base URL (CoinGecko-compatible)
  TIERQUOTE_RATE_TIMEOUT    Rate request timeout in seconds
  RUST_LOG                  Overrides the log filter
"#;

/// Estimate request-metered API pricing from the command line.
#[derive(Parser, Debug)]
#[command(
    name = "tierquote",
    version,
    about = "Estimate request-metered API pricing: tiers, custom quotes, USDT equivalents",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Daily request volume. Non-numeric input reads as 0.
    #[arg(
        short,
        long,
        env = "TIERQUOTE_DAILY",
        default_value = "1000",
        allow_hyphen_values = true
    )]
    daily: String,

    /// Monthly request volume; converted to daily and overrides --daily.
    #[arg(short, long, env = "TIERQUOTE_MONTHLY", allow_hyphen_values = true)]
    monthly: Option<String>,

    /// Snap the volume to the nearest 500/day step (minimum 500).
    #[arg(long)]
    snap: bool,

    /// Billing period: monthly or annual.
    #[arg(short, long, env = "TIERQUOTE_BILLING", default_value = "monthly")]
    billing: BillingPeriod,

    /// Minimum monthly price in rupees.
    #[arg(long, env = "TIERQUOTE_MIN_PRICE")]
    min_price: Option<Decimal>,

    /// Annual billing discount in whole percent.
    #[arg(long, env = "TIERQUOTE_ANNUAL_DISCOUNT",
          value_parser = clap::value_parser!(u32).range(0..=99))]
    annual_discount: Option<u32>,

    /// Exchange-rate API base URL.
    #[arg(long, env = "TIERQUOTE_RATE_ENDPOINT")]
    rate_endpoint: Option<String>,

    /// Stablecoin identifier on the rate API.
    #[arg(long, env = "TIERQUOTE_ASSET", default_value = "tether")]
    asset: String,

    /// Local currency code on the rate API.
    #[arg(long, env = "TIERQUOTE_VS_CURRENCY", default_value = "inr")]
    vs_currency: String,

    /// Exchange-rate request timeout in seconds.
    #[arg(long, env = "TIERQUOTE_RATE_TIMEOUT", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..=120))]
    rate_timeout: u64,

    /// Do not fetch the exchange rate.
    #[arg(long, env = "TIERQUOTE_OFFLINE")]
    offline: bool,

    /// Print only the custom estimate, not the tier table.
    #[arg(long)]
    estimate_only: bool,

    /// Output structured JSON instead of text.
    #[arg(long, env = "TIERQUOTE_JSON")]
    json: bool,

    /// Disable the spinner shown while the rate is fetched.
    #[arg(long, env = "TIERQUOTE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TIERQUOTE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "TIERQUOTE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.offline;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress || cli.json {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build estimator ──────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let daily = resolve_daily(&cli, config.days_per_month);
    let estimator = Estimator::new(config).context("Invalid configuration")?;

    // ── Exchange rate ────────────────────────────────────────────────────
    // The fetch is bounded by the client timeout; waiting for it here only
    // decides whether this one-shot output can show USDT figures.
    if !cli.offline {
        let handle = estimator
            .start_rate_fetch()
            .context("Failed to start exchange rate fetch")?;

        let spinner = show_progress.then(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
            );
            bar.set_prefix("Exchange rate");
            bar.set_message("Fetching USDT rate…");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });

        handle.await.context("Exchange rate task panicked")?;

        if let Some(bar) = spinner {
            bar.finish_and_clear();
        }
    }

    let quote = estimator.quote(daily, cli.billing);
    let rate = estimator.exchange_rate();

    if cli.json {
        print_json(&estimator, &quote, &rate, cli.estimate_only)?;
        return Ok(());
    }

    if !cli.quiet {
        print_rate_status(&rate);
    }
    if !cli.estimate_only {
        print_catalog(&estimator, cli.billing, &rate);
    }
    print_estimate(&quote, &rate);

    Ok(())
}

/// Map CLI args to `PricingConfig`.
fn build_config(cli: &Cli) -> Result<PricingConfig> {
    let mut builder = PricingConfig::builder().rate_timeout_secs(cli.rate_timeout);

    if let Some(price) = cli.min_price {
        builder = builder.min_monthly_price(price);
    }
    if let Some(percent) = cli.annual_discount {
        builder = builder.annual_discount_percent(percent);
    }
    if let Some(ref endpoint) = cli.rate_endpoint {
        builder = builder.rate_endpoint(endpoint.clone());
    }

    let mut config = builder.build().context("Invalid configuration")?;

    // Fields the builder doesn't have setters for
    config.rate_source.asset_id = cli.asset.clone();
    config.rate_source.vs_currency = cli.vs_currency.clone();

    config.validate().context("Invalid exchange rate source")?;
    Ok(config)
}

/// Turn `--daily` / `--monthly` text into a daily volume.
fn resolve_daily(cli: &Cli, days_per_month: u64) -> u64 {
    let phase = if cli.snap {
        InputPhase::Committed
    } else {
        InputPhase::Editing
    };
    match cli.monthly {
        Some(ref text) => input::normalize(VolumeField::Monthly, phase, text, days_per_month),
        None => input::normalize(VolumeField::Daily, phase, &cli.daily, days_per_month),
    }
}

fn print_rate_status(rate: &RateState<'_>) {
    match rate {
        RateState::Settled(r) => match &r.value {
            RateValue::Available(value) => eprintln!(
                "{} 1 USDT = ₹{}  {}",
                green("✔"),
                value,
                dim(&format!("({}, {})", r.pair, r.fetched_at.format("%Y-%m-%d %H:%M UTC")))
            ),
            RateValue::Unavailable(reason) => eprintln!(
                "{} USDT estimates unavailable: {}",
                yellow("⚠"),
                dim(&reason.to_string())
            ),
        },
        RateState::Pending => eprintln!("{} USDT estimates disabled", dim("·")),
    }
}

fn print_catalog(estimator: &Estimator, period: BillingPeriod, rate: &RateState<'_>) {
    let calc = estimator.calculator();
    println!("{}", bold("Fixed plans"));
    for tier in estimator.catalog() {
        let price = format::tier_price(tier, period, calc);
        print_tier(tier, price, period, rate);
    }
    println!();
}

fn print_tier(tier: &PricingTier, price: Price, period: BillingPeriod, rate: &RateState<'_>) {
    let name = if tier.is_popular {
        format!("{} {}", bold(&tier.name), yellow("★ Most Popular"))
    } else {
        bold(&tier.name)
    };

    match tier.monthly_price.amount() {
        Some(monthly) => {
            let mut line = format!(
                "  {:<32} {:>14}  {}",
                name,
                format::period_amount(price, period),
                dim(&format::stablecoin(monthly, rate)),
            );
            if let Some(note) = format::billed_annually_note(tier.monthly_price, period) {
                line.push_str(&format!("  {}", dim(&note)));
            }
            println!("{line}");
            println!(
                "      {} daily requests{}",
                tier.daily_volume,
                format::per_request(tier.per_request_price)
                    .map(|s| format!("  {}", dim(&s)))
                    .unwrap_or_default()
            );
        }
        None => println!("  {:<32} {:>14}", name, format::CONTACT_FOR_PRICING),
    }
    for feature in &tier.features {
        println!("      {} {}", green("✓"), feature);
    }
    println!("      [{}]", cyan(format::tier_call_to_action(tier)));
}

fn print_estimate(quote: &PricingQuote<'_>, rate: &RateState<'_>) {
    println!("{}", bold("Custom plan"));
    println!(
        "  {} daily / {} monthly requests",
        format::group_thousands(Decimal::from(quote.daily_volume)),
        format::group_thousands(Decimal::from(quote.monthly_volume)),
    );

    let price = quote.price();
    println!(
        "  Estimated cost: {}",
        bold(&format::period_amount(price, quote.billing_period))
    );
    if quote.billing_period == BillingPeriod::Annual {
        if let Some(saved) = quote.annual_savings().filter(|s| *s > Decimal::ZERO) {
            println!(
                "  {}",
                green(&format!(
                    "You save {}{} a year with annual billing",
                    format::LOCAL_SYMBOL,
                    format::group_thousands(saved)
                ))
            );
        }
    }
    if let Some(basis) = quote.stablecoin_basis() {
        println!("  {}", dim(&format::stablecoin(basis, rate)));
    }
    if let Some(unit) = format::per_request(quote.per_request_price) {
        println!("  {}", dim(&unit));
    }
    if let Some(tier) = quote.recommended_tier {
        println!(
            "  {} Based on your usage, the {} plan may be a better fit with predictable pricing.",
            cyan("ℹ"),
            bold(&tier.name)
        );
    }
    println!("  [{}]", cyan(format::quote_call_to_action(quote)));
}

fn print_json(
    estimator: &Estimator,
    quote: &PricingQuote<'_>,
    rate: &RateState<'_>,
    estimate_only: bool,
) -> Result<()> {
    let stablecoin = quote
        .stablecoin_basis()
        .and_then(|basis| rate.convert(basis));
    let exchange_rate = match rate {
        RateState::Settled(r) => serde_json::to_value(r).context("Failed to serialise rate")?,
        RateState::Pending => serde_json::Value::Null,
    };

    let mut body = serde_json::json!({
        "quote": quote,
        "stablecoin_estimate": stablecoin,
        "exchange_rate": exchange_rate,
    });
    if !estimate_only {
        body["catalog"] =
            serde_json::to_value(estimator.catalog()).context("Failed to serialise catalog")?;
    }

    let json = serde_json::to_string_pretty(&body).context("Failed to serialise output")?;
    println!("{json}");
    Ok(())
}
