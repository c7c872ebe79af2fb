//! Deployment of the token and AMM contracts from Hardhat artifacts.

use {
    crate::domain::eth::{Address, TxHash, U256},
    alloy::{
        network::TransactionBuilder,
        providers::Provider,
        rpc::types::TransactionRequest,
        sol_types::SolConstructor,
    },
    anyhow::{Context, Result},
    contracts::{
        alloy::{MockERC20, UniswapV2Router},
        artifact::Artifact,
        paths,
    },
    ethrpc::Web3,
    std::path::Path,
};

#[derive(Clone, Copy, Debug)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: TxHash,
}

/// Sends the creation transaction for `artifact` and waits for the contract
/// address.
async fn deploy(web3: &Web3, artifact: &Artifact, constructor_args: &[u8]) -> Result<Deployment> {
    let from = web3.require_signer()?;
    let code = artifact.deployment_code(constructor_args)?;
    let tx = TransactionRequest::default()
        .with_from(from)
        .with_deploy_code(code);
    let pending = web3
        .provider()
        .send_transaction(tx)
        .await
        .map_err(ethrpc::Error::from)?;
    tracing::info!(contract = %artifact.contract_name, tx_hash = %pending.tx_hash(), "deployment submitted");
    let receipt = pending.get_receipt().await.map_err(ethrpc::Error::from)?;
    anyhow::ensure!(
        receipt.status(),
        "deployment of {} reverted in {}",
        artifact.contract_name,
        receipt.transaction_hash
    );
    let address = receipt
        .contract_address
        .context("deployment receipt has no contract address")?;
    tracing::info!(contract = %artifact.contract_name, %address, "deployed");
    Ok(Deployment {
        address,
        tx_hash: receipt.transaction_hash,
    })
}

fn load(root: &Path, contract: &str) -> Result<Artifact> {
    let mut artifact = Artifact::load(&paths::artifact(root, contract))
        .with_context(|| format!("missing {contract} artifact; compile the contracts first"))?;
    if artifact.contract_name.is_empty() {
        artifact.contract_name = contract.to_owned();
    }
    Ok(artifact)
}

/// Deploys a `MockERC20` minting `initial_supply` (in base units) to the
/// signer.
pub async fn token(
    web3: &Web3,
    artifacts: &Path,
    name: &str,
    symbol: &str,
    initial_supply: U256,
) -> Result<Deployment> {
    let artifact = load(artifacts, paths::TOKEN)?;
    for function in ["mint", "burn", "owner"] {
        if !artifact.has_function(function) {
            tracing::warn!(function, "token artifact lacks function; supply commands will fail");
        }
    }
    let args = MockERC20::constructorCall {
        name: name.to_owned(),
        symbol: symbol.to_owned(),
        initialSupply: initial_supply,
    }
    .abi_encode();
    deploy(web3, &artifact, &args).await
}

#[derive(Clone, Copy, Debug)]
pub struct Amm {
    pub factory: Deployment,
    pub router: Deployment,
}

/// Deploys the factory and a router bound to it.
pub async fn amm(web3: &Web3, artifacts: &Path) -> Result<Amm> {
    let factory_artifact = load(artifacts, paths::FACTORY)?;
    let router_artifact = load(artifacts, paths::ROUTER)?;
    let factory = deploy(web3, &factory_artifact, &[]).await?;
    let args = UniswapV2Router::constructorCall {
        factory: factory.address,
    }
    .abi_encode();
    let router = deploy(web3, &router_artifact, &args).await?;
    Ok(Amm { factory, router })
}

/// Sets `KEY=value` lines in an env file, replacing existing assignments and
/// appending missing ones.
pub fn rewrite_env(contents: &str, updates: &[(&str, String)]) -> String {
    let mut pending = updates.to_vec();
    let mut lines = contents
        .lines()
        .map(|line| {
            let key = line.split_once('=').map(|(key, _)| key.trim());
            match pending.iter().position(|(name, _)| Some(*name) == key) {
                Some(i) => {
                    let (name, value) = pending.remove(i);
                    format!("{name}={value}")
                }
                None => line.to_owned(),
            }
        })
        .collect::<Vec<_>>();
    lines.extend(pending.into_iter().map(|(name, value)| format!("{name}={value}")));
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Writes the AMM addresses into the env file at `path`, creating it if
/// needed.
pub async fn update_env_file(path: &Path, amm: &Amm) -> Result<()> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err).with_context(|| format!("failed to read {path:?}")),
    };
    let updated = rewrite_env(
        &contents,
        &[
            ("FACTORY_ADDRESS", amm.factory.address.to_string()),
            ("ROUTER_ADDRESS", amm.router.address.to_string()),
        ],
    );
    tokio::fs::write(path, updated)
        .await
        .with_context(|| format!("failed to write {path:?}"))?;
    tracing::info!(?path, "env file updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_existing_and_appends_missing_keys() {
        let contents = "NODE_URL=http://localhost:8545\nROUTER_ADDRESS=0xold\n# comment\n";
        let updated = rewrite_env(
            contents,
            &[
                ("FACTORY_ADDRESS", "0xfac".to_owned()),
                ("ROUTER_ADDRESS", "0xnew".to_owned()),
            ],
        );
        assert_eq!(
            updated,
            "NODE_URL=http://localhost:8545\nROUTER_ADDRESS=0xnew\n# comment\nFACTORY_ADDRESS=0xfac\n"
        );
    }

    #[test]
    fn empty_file_gets_all_keys() {
        assert_eq!(rewrite_env("", &[("A", "1".to_owned())]), "A=1\n");
    }

    #[tokio::test]
    async fn updates_env_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let amm = Amm {
            factory: Deployment {
                address: Address::repeat_byte(1),
                tx_hash: TxHash::ZERO,
            },
            router: Deployment {
                address: Address::repeat_byte(2),
                tx_hash: TxHash::ZERO,
            },
        };
        update_env_file(&path, &amm).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            format!(
                "FACTORY_ADDRESS={}\nROUTER_ADDRESS={}\n",
                Address::repeat_byte(1),
                Address::repeat_byte(2)
            )
        );
    }

    #[tokio::test]
    async fn missing_artifacts_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let web3 = Web3::new("http://127.0.0.1:1".parse().unwrap(), None);
        let err = amm(&web3, dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("SimpleFactory"), "{err:#}");
    }
}
