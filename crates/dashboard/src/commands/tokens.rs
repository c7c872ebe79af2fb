use {
    super::Context,
    crate::{
        domain::{eth::TokenOps, tokens},
        infra::cli::TokensCommand,
    },
    anyhow::Result,
    model::token::DeployedToken,
    number::units::format_units,
};

pub async fn run(ctx: &Context, command: TokensCommand) -> Result<()> {
    match command {
        TokensCommand::List => list(ctx).await,
        TokensCommand::Add {
            address,
            name,
            symbol,
        } => {
            let name = match name {
                Some(name) => name,
                None => ctx.chain.name(address).await?,
            };
            let symbol = match symbol {
                Some(symbol) => symbol,
                None => ctx.chain.symbol(address).await?,
            };
            let entry = DeployedToken::new(address, name, symbol);
            ctx.registry.add(entry.clone())?;
            println!("registered {} at {}", entry.label(), address);
            Ok(())
        }
        TokensCommand::Remove { address } => {
            anyhow::ensure!(
                ctx.registry.remove(address)?,
                "token {address} is not registered"
            );
            println!("removed {address}");
            Ok(())
        }
    }
}

async fn list(ctx: &Context) -> Result<()> {
    let entries = ctx.registry.list()?;
    if entries.is_empty() {
        println!("no tokens registered");
        return Ok(());
    }
    for entry in &entries {
        match tokens::info(ctx.chain.as_ref(), entry).await {
            Ok(info) => println!(
                "{:<8} {:<24} decimals {:<3} supply {:>28}  owner {}  {}",
                info.symbol,
                info.name,
                info.decimals,
                format_units(info.total_supply, info.decimals),
                info.owner
                    .map(|owner| owner.to_string())
                    .unwrap_or_else(|| "unknown".to_owned()),
                info.address,
            ),
            Err(err) => println!("{:<8} {}  unavailable: {err}", entry.label(), entry.address),
        }
    }
    Ok(())
}
