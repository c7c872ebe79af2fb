use {
    crate::domain::eth::Address,
    shared::arguments::display_option,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
};

#[derive(clap::Parser)]
#[command(version, about = "Dev dashboard for ERC-20 tokens and a Uniswap V2 style AMM")]
pub struct Args {
    #[clap(flatten)]
    pub shared: shared::arguments::Arguments,

    /// Address of the Uniswap V2 style router.
    #[clap(long, env)]
    pub router_address: Option<Address>,

    /// Address of the pair factory.
    #[clap(long, env)]
    pub factory_address: Option<Address>,

    /// Token used as token A when neither the command nor the registry
    /// names one.
    #[clap(long, env)]
    pub token_a: Option<Address>,

    /// Token used as token B when neither the command nor the registry
    /// names one.
    #[clap(long, env)]
    pub token_b: Option<Address>,

    /// Path to the TOML file with liquidity and swap parameters.
    #[clap(long, env = "DASHBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of the Hardhat project holding the compiled contract artifacts.
    #[clap(long, env, default_value = ".")]
    pub artifacts: PathBuf,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug, strum::IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Command {
    /// Show the tokens the signer owns with their balances.
    Account {
        /// Keep refreshing balances and report account or chain changes
        /// until interrupted.
        #[clap(long)]
        watch: bool,
    },

    /// Deploy a mintable test token and add it to the registry.
    DeployToken {
        #[clap(long)]
        name: String,
        #[clap(long)]
        symbol: String,
        /// Whole tokens minted to the signer.
        #[clap(long, default_value = "1000000")]
        initial_supply: String,
    },

    /// Deploy the pair factory and the router.
    DeployAmm {
        /// Env file whose FACTORY_ADDRESS and ROUTER_ADDRESS are updated.
        #[clap(long)]
        env_file: Option<PathBuf>,
    },

    /// Manage the registry of deployed tokens.
    #[command(subcommand)]
    Tokens(TokensCommand),

    /// Mint tokens to the signer. Only the token owner may mint.
    Mint { token: Address, amount: String },

    /// Burn tokens held by the signer.
    Burn { token: Address, amount: String },

    /// Send registered tokens to another account.
    Transfer {
        token: Address,
        recipient: String,
        amount: String,
    },

    /// Quote and execute swaps through the router.
    #[command(subcommand)]
    Swap(SwapCommand),

    /// Deposit both tokens of a pair into its pool.
    AddLiquidity {
        amount_a: String,
        amount_b: String,
        /// The two tokens; defaults to the two newest registered tokens.
        #[clap(long, num_args = 2, value_names = ["TOKEN_A", "TOKEN_B"])]
        tokens: Option<Vec<Address>>,
    },

    /// Watch the reserves of every pool of registered tokens.
    Monitor {
        /// Keep polling and top up pools that run low. Without it a single
        /// check is made.
        #[clap(long)]
        auto_manage: bool,
    },

    /// Create, fund and test a pool for every pair of registered tokens.
    SetupPools {
        /// Directory the report is written to.
        #[clap(long, default_value = ".")]
        report_dir: PathBuf,
    },

    /// Mint missing balances and add liquidity to every pool.
    EnsureLiquidity {
        #[clap(long, default_value = ".")]
        report_dir: PathBuf,
    },

    /// Check the reserves of every pool against an expected value.
    VerifyPools {
        #[clap(long, default_value = crate::domain::pools::verify::EXPECTED_RESERVE)]
        expected: String,
        #[clap(long, default_value = ".")]
        report_dir: PathBuf,
    },

    /// Inspect the local transaction log.
    #[command(subcommand)]
    Transactions(TransactionsCommand),

    /// Inspect or change the connected chain.
    #[command(subcommand)]
    Network(NetworkCommand),
}

#[derive(clap::Subcommand, Debug)]
pub enum TokensCommand {
    /// List registered tokens with their live metadata.
    List,
    /// Register an already deployed token.
    Add {
        address: Address,
        /// Read from the contract when omitted.
        #[clap(long)]
        name: Option<String>,
        /// Read from the contract when omitted.
        #[clap(long)]
        symbol: Option<String>,
    },
    /// Forget a registered token.
    Remove { address: Address },
}

#[derive(clap::Subcommand, Debug)]
pub enum SwapCommand {
    /// Price an amount of token A, or with `--amount-b` the token A needed
    /// for an amount of token B.
    Quote {
        token_a: Address,
        token_b: Address,
        #[clap(long, required_unless_present = "amount_b", conflicts_with = "amount_b")]
        amount_a: Option<String>,
        #[clap(long)]
        amount_b: Option<String>,
    },
    /// Swap an exact amount of token A for token B.
    Execute {
        token_a: Address,
        token_b: Address,
        amount: String,
    },
    /// Type amounts on stdin and see live quotes.
    Interactive { token_a: Address, token_b: Address },
}

#[derive(clap::Subcommand, Debug)]
pub enum TransactionsCommand {
    List {
        /// Include simulated and placeholder entries.
        #[clap(long)]
        all: bool,
    },
    Clear,
}

#[derive(clap::Subcommand, Debug)]
pub enum NetworkCommand {
    /// Compare the connected chain with the expected one.
    Status,
    /// Ask the wallet to switch chains, registering the chain if needed.
    Switch {
        #[clap(long, default_value_t = ethrpc::chain::SEPOLIA)]
        chain_id: u64,
        /// RPC endpoint announced when the chain has to be registered.
        #[clap(long)]
        rpc_url: Option<String>,
    },
}

impl Display for Args {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            shared,
            router_address,
            factory_address,
            token_a,
            token_b,
            config,
            artifacts,
            command,
        } = self;

        write!(f, "{shared}")?;
        display_option(f, "router_address", router_address)?;
        display_option(f, "factory_address", factory_address)?;
        display_option(f, "token_a", token_a)?;
        display_option(f, "token_b", token_b)?;
        display_option(f, "config", &config.as_ref().map(|path| path.display()))?;
        writeln!(f, "artifacts: {}", artifacts.display())?;
        writeln!(f, "command: {command:?}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, clap::Parser};

    #[test]
    fn parses_commands() {
        let args = Args::try_parse_from([
            "dashboard",
            "--router-address",
            "0x0000000000000000000000000000000000000001",
            "monitor",
            "--auto-manage",
        ])
        .unwrap();
        assert_eq!(args.router_address, Some(Address::with_last_byte(1)));
        assert!(matches!(args.command, Command::Monitor { auto_manage: true }));
        assert_eq!(<&str>::from(&args.command), "monitor");

        let args = Args::try_parse_from([
            "dashboard",
            "add-liquidity",
            "10",
            "20",
            "--tokens",
            "0x0000000000000000000000000000000000000001",
            "0x0000000000000000000000000000000000000002",
        ])
        .unwrap();
        let Command::AddLiquidity { tokens, .. } = args.command else {
            panic!("wrong command");
        };
        assert_eq!(
            tokens,
            Some(vec![Address::with_last_byte(1), Address::with_last_byte(2)])
        );
    }

    #[test]
    fn quote_needs_exactly_one_amount() {
        let base = [
            "dashboard",
            "swap",
            "quote",
            "0x0000000000000000000000000000000000000001",
            "0x0000000000000000000000000000000000000002",
        ];
        assert!(Args::try_parse_from(base).is_err());
        assert!(Args::try_parse_from(base.into_iter().chain(["--amount-a", "1"])).is_ok());
        assert!(
            Args::try_parse_from(
                base.into_iter()
                    .chain(["--amount-a", "1", "--amount-b", "2"])
            )
            .is_err()
        );
    }

    #[test]
    fn displays_effective_arguments() {
        let args = Args::try_parse_from(["dashboard", "network", "status"]).unwrap();
        let shown = args.to_string();
        assert!(shown.contains("router_address: None"));
        assert!(shown.contains("artifacts: ."));
        assert!(shown.contains("command: Network(Status)"));
    }
}
