use {
    super::Context,
    crate::{
        domain::{eth::Address, supply},
        infra::observe,
    },
    anyhow::Result,
};

async fn token(ctx: &Context, address: Address) -> supply::Token {
    supply::Token {
        address,
        symbol: ctx.symbol(address).await,
    }
}

pub async fn mint(ctx: &Context, address: Address, amount: &str) -> Result<()> {
    ctx.ensure_chain().await?;
    let token = token(ctx, address).await;
    let confirmation =
        supply::mint(ctx.chain.as_ref(), ctx.chain.as_ref(), &ctx.log, &token, amount).await?;
    observe::confirmed("mint", &confirmation);
    println!("minted {amount} {} (tx {})", token.symbol, confirmation.tx_hash);
    Ok(())
}

pub async fn burn(ctx: &Context, address: Address, amount: &str) -> Result<()> {
    ctx.ensure_chain().await?;
    let token = token(ctx, address).await;
    let confirmation =
        supply::burn(ctx.chain.as_ref(), ctx.chain.as_ref(), &ctx.log, &token, amount).await?;
    observe::confirmed("burn", &confirmation);
    println!("burned {amount} {} (tx {})", token.symbol, confirmation.tx_hash);
    Ok(())
}
