use {
    super::Context,
    crate::{
        domain::{eth::TokenOps, tokens},
        infra::{deploy, observe},
    },
    anyhow::{Context as _, Result},
    chrono::Utc,
    contracts::paths,
    ethrpc::chain::Chain,
    model::token::DeployedToken,
    number::units::{format_units, parse_units},
    std::path::Path,
};

pub async fn token(ctx: &Context, name: &str, symbol: &str, initial_supply: &str) -> Result<()> {
    let account = ctx.account()?;
    ctx.ensure_chain().await?;
    let supply = parse_units(initial_supply, 18)
        .with_context(|| format!("{initial_supply:?} is not a valid initial supply"))?;

    let deployment = deploy::token(ctx.chain.web3(), &ctx.artifacts, name, symbol, supply).await?;
    observe::deployed(paths::TOKEN, &deployment);

    let network = match ctx.chain.web3().chain_id().await {
        Ok(id) => Some(Chain::for_id(id, ctx.chain.web3().url().as_str()).chain_name),
        Err(err) => {
            tracing::warn!(?err, "failed to read chain id for the registry entry");
            None
        }
    };
    let entry = DeployedToken {
        initial_supply: Some(initial_supply.to_owned()),
        admin: Some(account),
        network,
        deployed_at: Some(Utc::now()),
        ..DeployedToken::new(deployment.address, name, symbol)
    };
    ctx.registry.add(entry.clone())?;
    println!(
        "deployed {} at {} (tx {})",
        entry.label(),
        deployment.address,
        deployment.tx_hash
    );

    let info = tokens::info(ctx.chain.as_ref(), &entry).await?;
    let (balance, native) = futures::try_join!(
        ctx.chain.balance_of(deployment.address, account),
        ctx.chain.web3().native_balance(account)
    )?;
    println!("name:           {}", info.name);
    println!("symbol:         {}", info.symbol);
    println!("decimals:       {}", info.decimals);
    println!("total supply:   {}", format_units(info.total_supply, info.decimals));
    match info.owner {
        Some(owner) => println!("owner:          {owner}"),
        None => println!("owner:          unknown"),
    }
    println!("native balance: {} ETH", format_units(native, 18));
    println!("token balance:  {}", format_units(balance, info.decimals));
    Ok(())
}

pub async fn amm(ctx: &Context, env_file: Option<&Path>) -> Result<()> {
    ctx.account()?;
    ctx.ensure_chain().await?;
    let amm = deploy::amm(ctx.chain.web3(), &ctx.artifacts).await?;
    observe::deployed(paths::FACTORY, &amm.factory);
    observe::deployed(paths::ROUTER, &amm.router);
    println!("factory: {}", amm.factory.address);
    println!("router:  {}", amm.router.address);
    if let Some(path) = env_file {
        deploy::update_env_file(path, &amm).await?;
        println!("updated {}", path.display());
    }
    Ok(())
}
