use {
    crate::domain::{liquidity, swap},
    std::time::Duration,
};

pub mod file;

/// Runtime parameters of the dashboard that are not given on the command
/// line.
#[derive(Clone, Debug)]
pub struct Config {
    pub liquidity: liquidity::Config,
    pub swap: swap::Config,
    pub poll_interval: Duration,
    pub balance_refresh_interval: Duration,
    pub quote_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            liquidity: Default::default(),
            swap: Default::default(),
            poll_interval: Duration::from_secs(30),
            balance_refresh_interval: Duration::from_secs(10),
            quote_debounce: Duration::from_millis(500),
        }
    }
}
