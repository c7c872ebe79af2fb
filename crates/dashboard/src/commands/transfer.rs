use {
    super::Context,
    crate::{
        domain::{eth::Address, transfer},
        infra::observe,
    },
    anyhow::Result,
};

pub async fn run(ctx: &Context, token: Address, recipient: String, amount: String) -> Result<()> {
    let request = transfer::Request {
        token,
        recipient,
        amount,
    };
    let confirmation = transfer::transfer(
        ctx.chain.as_ref(),
        ctx.chain.as_ref(),
        &ctx.registry,
        &ctx.log,
        ctx.expected_chain,
        &request,
    )
    .await?;
    observe::confirmed("transfer", &confirmation);
    println!(
        "sent {} {} to {} (tx {})",
        request.amount,
        ctx.symbol(token).await,
        request.recipient.trim(),
        confirmation.tx_hash
    );
    Ok(())
}
