use {
    super::Context,
    crate::infra::cli::NetworkCommand,
    anyhow::Result,
    ethrpc::chain::Chain,
};

pub async fn run(ctx: &Context, command: NetworkCommand) -> Result<()> {
    let web3 = ctx.chain.web3();
    match command {
        NetworkCommand::Status => {
            let actual = web3.chain_id().await?;
            let name = Chain::for_id(actual, web3.url().as_str()).chain_name;
            println!("connected to {name} ({actual}) via {}", web3.url());
            match ctx.expected_chain {
                Some(expected) if expected == actual => println!("on the expected chain"),
                Some(expected) => println!(
                    "wrong network: expected {} ({expected})",
                    Chain::for_id(expected, "").chain_name
                ),
                None => println!("no expected chain configured"),
            }
        }
        NetworkCommand::Switch { chain_id, rpc_url } => {
            let rpc_url = rpc_url.unwrap_or_else(|| web3.url().to_string());
            let chain = Chain::for_id(chain_id, rpc_url);
            web3.switch_chain(&chain).await?;
            tracing::info!(chain = %chain.chain_name, chain_id, "switched chain");
            println!("switched to {} ({chain_id})", chain.chain_name);
        }
    }
    Ok(())
}
