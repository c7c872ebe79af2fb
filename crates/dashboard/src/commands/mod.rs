//! Runners for the CLI subcommands. Each one wires the domain operations to
//! the node adapter and prints its outcome.

mod account;
mod deploy;
mod liquidity;
mod network;
mod pools;
mod supply;
mod swap;
mod tokens;
mod transactions;
mod transfer;

use {
    crate::{
        domain::{
            eth::{Address, AmmOps, TokenOps},
            pools::Operator,
        },
        infra::{Blockchain, Config, cli::Command},
    },
    anyhow::{Context as _, Result},
    shared::{registry::TokenRegistry, store::Store, transaction_log::TransactionLog},
    std::{path::PathBuf, sync::Arc},
};

/// Everything a command needs, built once from the arguments.
pub struct Context {
    pub chain: Arc<Blockchain>,
    pub store: Arc<dyn Store>,
    pub registry: TokenRegistry,
    pub log: TransactionLog,
    pub config: Config,
    pub expected_chain: Option<u64>,
    pub artifacts: PathBuf,
    /// `TOKEN_A` and `TOKEN_B` from the environment.
    pub default_tokens: (Option<Address>, Option<Address>),
}

impl Context {
    fn account(&self) -> Result<Address> {
        self.chain
            .web3()
            .require_signer()
            .context("this command sends transactions; pass --private-key")
    }

    fn operator(&self) -> Result<Operator<'_>> {
        Ok(Operator {
            tokens: self.chain.as_ref(),
            amm: self.chain.as_ref(),
            account: self.account()?,
            router: self
                .chain
                .router()
                .context("no router configured; pass --router-address")?,
        })
    }

    async fn ensure_chain(&self) -> Result<()> {
        if let Some(expected) = self.expected_chain {
            self.chain.web3().ensure_chain(expected).await?;
        }
        Ok(())
    }

    /// Symbol from the registry, then from the contract, then the address.
    async fn symbol(&self, token: Address) -> String {
        if let Ok(Some(entry)) = self.registry.find(token) {
            return entry.symbol;
        }
        match self.chain.symbol(token).await {
            Ok(symbol) => symbol,
            Err(_) => token.to_string(),
        }
    }
}

pub async fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Account { watch } => account::show(ctx, watch).await,
        Command::DeployToken {
            name,
            symbol,
            initial_supply,
        } => deploy::token(ctx, &name, &symbol, &initial_supply).await,
        Command::DeployAmm { env_file } => deploy::amm(ctx, env_file.as_deref()).await,
        Command::Tokens(command) => tokens::run(ctx, command).await,
        Command::Mint { token, amount } => supply::mint(ctx, token, &amount).await,
        Command::Burn { token, amount } => supply::burn(ctx, token, &amount).await,
        Command::Transfer {
            token,
            recipient,
            amount,
        } => transfer::run(ctx, token, recipient, amount).await,
        Command::Swap(command) => swap::run(ctx, command).await,
        Command::AddLiquidity {
            amount_a,
            amount_b,
            tokens,
        } => liquidity::add(ctx, tokens, amount_a, amount_b).await,
        Command::Monitor { auto_manage } => liquidity::monitor(ctx, auto_manage).await,
        Command::SetupPools { report_dir } => pools::setup(ctx, &report_dir).await,
        Command::EnsureLiquidity { report_dir } => pools::ensure(ctx, &report_dir).await,
        Command::VerifyPools {
            expected,
            report_dir,
        } => pools::verify(ctx, &expected, &report_dir).await,
        Command::Transactions(command) => transactions::run(ctx, command),
        Command::Network(command) => network::run(ctx, command).await,
    }
}
