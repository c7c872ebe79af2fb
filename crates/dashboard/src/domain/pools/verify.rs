//! Checks that every pair holds the expected reserves.

use {
    super::{ReserveMap, pair_name, pairs, reserves},
    crate::domain::eth::{self, Address, AmmOps, TokenOps},
    model::token::DeployedToken,
    serde::Serialize,
};

pub const REPORT_FILE: &str = "verification_report.json";
pub const EXPECTED_RESERVE: &str = "2000.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    NotFound,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub pair: String,
    pub pair_address: Option<Address>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserves: Option<ReserveMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

/// Number of correct pairs out of all verified pairs.
pub fn summary(entries: &[Entry]) -> (usize, usize) {
    let correct = entries
        .iter()
        .filter(|entry| entry.status == Status::Correct)
        .count();
    (correct, entries.len())
}

/// Compares both formatted reserves of every pair with `expected`. Pairs
/// whose state cannot be read are logged and skipped.
pub async fn verify(
    tokens: &dyn TokenOps,
    amm: &dyn AmmOps,
    registered: &[DeployedToken],
    expected: &str,
) -> Vec<Entry> {
    let mut entries = Vec::new();
    for (a, b) in pairs(registered) {
        match verify_pair(tokens, amm, a, b, expected).await {
            Ok(entry) => {
                tracing::info!(pair = %entry.pair, status = %entry.status, reserves = ?entry.reserves, "verified");
                entries.push(entry);
            }
            Err(err) => tracing::error!(pair = %pair_name(a, b), ?err, "failed to verify pool"),
        }
    }
    entries
}

async fn verify_pair(
    tokens: &dyn TokenOps,
    amm: &dyn AmmOps,
    a: &DeployedToken,
    b: &DeployedToken,
    expected: &str,
) -> eth::Result<Entry> {
    let pair = pair_name(a, b);
    let Some(pair_address) = amm.get_pair(a.address, b.address).await? else {
        return Ok(Entry {
            pair,
            pair_address: None,
            status: Status::NotFound,
            reserves: None,
            expected: None,
        });
    };
    let reserves = reserves(tokens, amm, pair_address, a, b).await?;
    let status = if reserves.values().all(|reserve| reserve == expected) {
        Status::Correct
    } else {
        Status::Incorrect
    };
    Ok(Entry {
        pair,
        pair_address: Some(pair_address),
        status,
        reserves: Some(reserves),
        expected: Some(expected.to_owned()),
    })
}
