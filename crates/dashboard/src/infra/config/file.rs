//! The optional TOML configuration file.

use {
    super::Config,
    crate::domain::{liquidity, swap},
    anyhow::{Context, Result},
    number::units::{parse_decimal, parse_units},
    serde::Deserialize,
    std::{path::Path, time::Duration},
};

/// Loads the configuration file. Settings missing from the file keep their
/// defaults.
pub async fn load(path: &Path) -> Result<Config> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    parse(&data).with_context(|| format!("invalid configuration in {path:?}"))
}

fn parse(data: &str) -> Result<Config> {
    let file: File = toml::from_str(data)?;
    let min_liquidity = parse_decimal(&file.min_liquidity).context("min-liquidity")?;
    parse_units(&file.top_up_amount, 18).context("top-up-amount")?;
    anyhow::ensure!(
        file.slippage_bps <= 10_000,
        "slippage-bps must be at most 10000"
    );

    Ok(Config {
        liquidity: liquidity::Config {
            min_liquidity,
            top_up_amount: file.top_up_amount,
            deadline: file.deadline,
            gas_limit: file.add_liquidity_gas_limit,
        },
        swap: swap::Config {
            deadline: file.deadline,
            slippage_bps: file.slippage_bps,
            gas_limit: file.swap_gas_limit,
        },
        poll_interval: file.poll_interval,
        balance_refresh_interval: file.balance_refresh_interval,
        quote_debounce: file.quote_debounce,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct File {
    /// Reserve of the first token of a pool below which it counts as low.
    #[serde(default = "default_min_liquidity")]
    min_liquidity: String,

    /// Amount of each token the monitor adds to a low pool.
    #[serde(default = "default_top_up_amount")]
    top_up_amount: String,

    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    poll_interval: Duration,

    #[serde(with = "humantime_serde", default = "default_balance_refresh_interval")]
    balance_refresh_interval: Duration,

    /// Validity of submitted swaps and deposits.
    #[serde(with = "humantime_serde", default = "default_deadline")]
    deadline: Duration,

    #[serde(default = "default_slippage_bps")]
    slippage_bps: u16,

    #[serde(default = "default_add_liquidity_gas_limit")]
    add_liquidity_gas_limit: u64,

    #[serde(default = "default_swap_gas_limit")]
    swap_gas_limit: u64,

    #[serde(with = "humantime_serde", default = "default_quote_debounce")]
    quote_debounce: Duration,
}

fn default_min_liquidity() -> String {
    "10000".to_owned()
}

fn default_top_up_amount() -> String {
    "15000".to_owned()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_balance_refresh_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_deadline() -> Duration {
    Duration::from_secs(20 * 60)
}

fn default_slippage_bps() -> u16 {
    200
}

fn default_add_liquidity_gas_limit() -> u64 {
    500_000
}

fn default_swap_gas_limit() -> u64 {
    350_000
}

fn default_quote_debounce() -> Duration {
    Duration::from_millis(500)
}
