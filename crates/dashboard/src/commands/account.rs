use {
    super::Context,
    crate::{
        domain::{eth::Address, tokens},
        infra::observe,
    },
    anyhow::{Context as _, Result},
    ethrpc::watcher::{self, Event},
    number::units::format_units,
    shared::registry,
};

/// The signer, or the first account the endpoint exposes.
async fn resolve(ctx: &Context) -> Result<Address> {
    if let Some(account) = ctx.chain.web3().account() {
        return Ok(account);
    }
    let accounts = ctx.chain.web3().request_accounts().await?;
    accounts
        .first()
        .copied()
        .context("no account available; pass --private-key")
}

async fn render(ctx: &Context, account: Address) -> Result<()> {
    let entries = ctx.registry.list()?;
    let view =
        tokens::account_view(ctx.chain.as_ref(), ctx.chain.as_ref(), &entries, account).await;
    println!("account: {}", view.account);
    match view.native_balance {
        Some(balance) => println!("native balance: {} ETH", format_units(balance, 18)),
        None => println!("native balance: unavailable"),
    }
    if view.holdings.is_empty() {
        println!("no owned tokens");
    }
    for holding in &view.holdings {
        println!(
            "  {:<8} {:<24} {:>28}  {}",
            holding.token.symbol,
            holding.token.name,
            format_units(holding.balance, holding.token.decimals),
            holding.token.address,
        );
    }
    Ok(())
}

pub async fn show(ctx: &Context, watch: bool) -> Result<()> {
    let mut account = resolve(ctx).await?;
    render(ctx, account).await?;
    if !watch {
        return Ok(());
    }

    let interval = ctx.config.balance_refresh_interval;
    let mut events = watcher::spawn(ctx.chain.web3().clone(), interval);
    let mut changes = ctx.store.subscribe();
    let mut refresh = tokio::time::interval(interval);
    refresh.tick().await;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = refresh.tick() => {}
            Some(event) = events.recv() => {
                observe::wallet_event(&event);
                match event {
                    Event::AccountsChanged(accounts) => {
                        if let Some(first) = accounts.first() {
                            account = *first;
                        }
                    }
                    Event::Disconnected => {
                        println!("wallet disconnected");
                        continue;
                    }
                    Event::ChainChanged(chain_id) => println!("chain changed to {chain_id}"),
                }
            }
            Ok(change) = changes.recv() => {
                if change.key != registry::KEY {
                    continue;
                }
            }
            _ = &mut shutdown => return Ok(()),
        }
        if let Err(err) = render(ctx, account).await {
            tracing::warn!(?err, "failed to refresh account view");
        }
    }
}
