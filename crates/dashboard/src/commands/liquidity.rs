use {
    super::Context,
    crate::{
        domain::{
            eth::{Address, AmmOps},
            liquidity::{Monitor, Scheduler},
            pools::{self, Deposit},
        },
        infra::observe,
    },
    anyhow::{Context as _, Result},
    model::{pool::LiquidityStatus, token::DeployedToken},
    std::sync::Arc,
    tokio::sync::watch,
};

/// Explicit tokens win, then the two newest registered tokens, then the
/// configured defaults.
fn pick_tokens(
    explicit: Option<Vec<Address>>,
    registered: &[DeployedToken],
    defaults: (Option<Address>, Option<Address>),
) -> Option<(Address, Address)> {
    if let Some([a, b]) = explicit.as_deref() {
        return Some((*a, *b));
    }
    if let [a, b, ..] = registered {
        return Some((a.address, b.address));
    }
    match defaults {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    }
}

pub async fn add(
    ctx: &Context,
    tokens: Option<Vec<Address>>,
    amount_a: String,
    amount_b: String,
) -> Result<()> {
    let operator = ctx.operator()?;
    ctx.ensure_chain().await?;
    let (token_a, token_b) = pick_tokens(tokens, &ctx.registry.list()?, ctx.default_tokens)
        .context("no tokens selected; pass --tokens or register two tokens")?;
    let deposit = Deposit {
        token_a,
        token_b,
        amount_a,
        amount_b,
    };
    let confirmation = pools::add_liquidity(operator, &ctx.log, &deposit).await?;
    observe::confirmed("add liquidity", &confirmation);
    println!(
        "added {} {} and {} {} (tx {})",
        deposit.amount_a,
        ctx.symbol(token_a).await,
        deposit.amount_b,
        ctx.symbol(token_b).await,
        confirmation.tx_hash
    );
    Ok(())
}

fn print_status(status: &LiquidityStatus) -> Result<()> {
    observe::liquidity_status(status);
    println!("{}", serde_json::to_string_pretty(status)?);
    Ok(())
}

pub async fn monitor(ctx: &Context, auto_manage: bool) -> Result<()> {
    let account = ctx.chain.web3().account();
    if auto_manage && (account.is_none() || ctx.chain.router().is_none()) {
        tracing::warn!("auto-manage needs a signer and a router; low pools are only reported");
    }
    let monitor = Arc::new(Monitor::new(
        ctx.chain.clone(),
        ctx.chain.clone(),
        ctx.registry.clone(),
        account,
        ctx.config.liquidity.clone(),
    ));
    tracing::info!(
        interval = %humantime::format_duration(ctx.config.poll_interval),
        auto_manage,
        "starting liquidity monitor"
    );
    let scheduler = Scheduler::new(monitor.clone(), ctx.config.poll_interval);
    let (_enabled, enabled) = watch::channel(auto_manage);
    let mut ticks = monitor.subscribe();
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(?err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        tracing::info!("stopping monitor");
    };

    let run = scheduler.run(enabled, shutdown);
    tokio::pin!(run);
    let mut printed = false;
    loop {
        tokio::select! {
            () = &mut run => break,
            Ok(()) = ticks.changed() => {
                print_status(&monitor.status(auto_manage))?;
                printed = true;
            }
        }
    }
    if !printed || ticks.has_changed().unwrap_or(false) {
        print_status(&monitor.status(auto_manage))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(bytes: &[u8]) -> Vec<DeployedToken> {
        bytes
            .iter()
            .map(|byte| DeployedToken::new(Address::repeat_byte(*byte), "", ""))
            .collect()
    }

    #[test]
    fn token_selection_order() {
        let defaults = (Some(Address::repeat_byte(8)), Some(Address::repeat_byte(9)));
        let explicit = vec![Address::repeat_byte(5), Address::repeat_byte(6)];

        assert_eq!(
            pick_tokens(Some(explicit), &registered(&[1, 2]), defaults),
            Some((Address::repeat_byte(5), Address::repeat_byte(6)))
        );
        assert_eq!(
            pick_tokens(None, &registered(&[1, 2, 3]), defaults),
            Some((Address::repeat_byte(1), Address::repeat_byte(2)))
        );
        assert_eq!(
            pick_tokens(None, &registered(&[1]), defaults),
            Some((Address::repeat_byte(8), Address::repeat_byte(9)))
        );
        assert_eq!(pick_tokens(None, &[], (Some(Address::ZERO), None)), None);
    }

    #[tokio::test]
    async fn single_check_without_tokens_reports_empty_status() {
        let ctx = crate::commands::tests::context(false);
        monitor(&ctx, false).await.unwrap();
    }
}
