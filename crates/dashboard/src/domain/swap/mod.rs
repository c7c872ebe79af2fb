//! Quoting and executing exact-input swaps through the router.

pub mod debounce;
mod execute;
mod quote;

pub use {
    execute::Swapper,
    quote::{Quote, quote},
};
use {
    crate::domain::eth::{Address, U256},
    number::units::{ParseError, format_units, parse_units},
    std::{sync::LazyLock, time::Duration},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SwapStatus {
    NoSigner,
    Approving,
    Pending,
    Success,
    Failed,
    Rejected,
    Error,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub deadline: Duration,
    /// Accepted price movement between quote and execution in basis points.
    pub slippage_bps: u16,
    pub gas_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(20 * 60),
            slippage_bps: 200,
            gas_limit: 350_000,
        }
    }
}

const BPS: u64 = 10_000;

/// `floor(quote * (1 - slippage))` computed without intermediate overflow.
pub fn min_amount_out(quote: U256, slippage_bps: u16) -> U256 {
    let keep = U256::from(BPS.saturating_sub(u64::from(slippage_bps)));
    let bps = U256::from(BPS);
    let (whole, rest) = (quote / bps, quote % bps);
    whole * keep + rest * keep / bps
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    A,
    B,
}

static AMOUNT_INPUT: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^\d*\.?\d{0,18}$").expect("valid amount regex"));

/// A typed amount scaled to `decimals`. `None` while the field holds no
/// positive number yet.
fn typed_amount(amount: &str, decimals: u8) -> Result<Option<U256>, ParseError> {
    match parse_units(amount, decimals) {
        Ok(amount) if amount.is_zero() => Ok(None),
        Ok(amount) => Ok(Some(amount)),
        Err(ParseError::Empty | ParseError::Invalid(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Whether `input` may be typed into an amount field.
pub fn accepts(input: &str) -> bool {
    input.is_empty() || AMOUNT_INPUT.is_match(input)
}

/// State of the swap form. Every change bumps `revision` so that quotes
/// computed for an older state can be discarded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
    pub token_a: Option<Token>,
    pub token_b: Option<Token>,
    pub amount_a: String,
    pub amount_b: String,
    pub last_field: Field,
    pub revision: u64,
}

impl Form {
    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn select_token_a(&mut self, token: Token) {
        self.token_a = Some(token);
        self.clear_amounts();
    }

    pub fn select_token_b(&mut self, token: Token) {
        self.token_b = Some(token);
        self.clear_amounts();
    }

    pub fn clear_amounts(&mut self) {
        self.amount_a.clear();
        self.amount_b.clear();
        self.touch();
    }

    /// Sets the input amount, clamped to `balance` (in token A units) when it
    /// exceeds it. Returns `false` and leaves the form untouched for input
    /// that is not a decimal number.
    pub fn set_amount_a(&mut self, input: &str, balance: Option<U256>) -> bool {
        if !accepts(input) {
            return false;
        }
        self.amount_a = match (&self.token_a, balance) {
            (Some(token), Some(balance)) => match parse_units(input, token.decimals) {
                Ok(amount) if amount > balance => format_units(balance, token.decimals),
                _ => input.to_owned(),
            },
            _ => input.to_owned(),
        };
        self.last_field = Field::A;
        self.touch();
        true
    }

    pub fn set_amount_b(&mut self, input: &str) -> bool {
        if !accepts(input) {
            return false;
        }
        self.amount_b = input.to_owned();
        self.last_field = Field::B;
        self.touch();
        true
    }

    /// Swaps tokens and amounts; the new token A amount becomes the input.
    pub fn switch_tokens(&mut self) {
        std::mem::swap(&mut self.token_a, &mut self.token_b);
        std::mem::swap(&mut self.amount_a, &mut self.amount_b);
        self.last_field = Field::A;
        self.touch();
    }

    /// Applies a quote computed for `revision`. Stale quotes are ignored.
    pub fn apply(&mut self, revision: u64, quote: Quote) -> bool {
        if revision != self.revision {
            return false;
        }
        match quote {
            Quote::Unchanged => return false,
            Quote::Counterpart(Field::A, amount) => self.amount_a = amount,
            Quote::Counterpart(Field::B, amount) => self.amount_b = amount,
            Quote::ClearBoth => {
                self.amount_a.clear();
                self.amount_b.clear();
            }
        }
        true
    }
}
