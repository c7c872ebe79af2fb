//! Command line arguments that every dashboard command shares.

use {
    alloy::signers::local::PrivateKeySigner,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
    url::Url,
};

#[derive(clap::Parser)]
#[group(skip)]
pub struct Arguments {
    /// JSON-RPC endpoint of the node (or wallet bridge).
    #[clap(long, env, default_value = "http://127.0.0.1:8545")]
    pub node_url: Url,

    /// Hex encoded key of the account that signs transactions. Commands that
    /// only read chain state work without it.
    #[clap(long, env, value_parser = parse_private_key)]
    pub private_key: Option<PrivateKeySigner>,

    /// Chain the dashboard refuses to send transactions outside of.
    #[clap(long, env)]
    pub chain_id: Option<u64>,

    /// Directory holding the token registry and the transaction log.
    #[clap(long, env, default_value = ".dashboard")]
    pub data_dir: PathBuf,

    #[clap(
        long,
        env,
        default_value = "warn,dashboard=debug,shared=debug,ethrpc=debug"
    )]
    pub log_filter: String,

    /// Emit logs as JSON.
    #[clap(long, env, default_value = "false")]
    pub use_json_logs: bool,
}

impl Arguments {
    pub fn web3(&self) -> ethrpc::Web3 {
        ethrpc::Web3::new(self.node_url.clone(), self.private_key.clone())
    }
}

fn parse_private_key(s: &str) -> Result<PrivateKeySigner, String> {
    s.trim()
        .parse()
        .map_err(|err| format!("invalid private key: {err}"))
}

pub fn display_option(f: &mut Formatter<'_>, name: &str, option: &Option<impl Display>) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}

pub fn display_secret_option<T>(f: &mut Formatter<'_>, name: &str, option: Option<&T>) -> fmt::Result {
    display_option(f, name, &option.as_ref().map(|_| "SECRET"))
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            node_url,
            private_key,
            chain_id,
            data_dir,
            log_filter,
            use_json_logs,
        } = self;

        writeln!(f, "node_url: {node_url}")?;
        display_secret_option(f, "private_key", private_key.as_ref())?;
        display_option(
            f,
            "account",
            &private_key.as_ref().map(|signer| signer.address()),
        )?;
        display_option(f, "chain_id", chain_id)?;
        writeln!(f, "data_dir: {}", data_dir.display())?;
        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, clap::Parser};

    // Well known first Hardhat development account.
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn redacts_private_key() {
        let args = Arguments::try_parse_from(["test", "--private-key", KEY, "--chain-id", "31337"])
            .unwrap();
        let shown = args.to_string();
        assert!(shown.contains("private_key: SECRET"));
        assert!(!shown.contains(&KEY[2..]));
        assert!(shown.contains("account: 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert!(shown.contains("chain_id: 31337"));
    }

    #[test]
    fn read_only_by_default() {
        let args = Arguments::try_parse_from(["test"]).unwrap();
        assert!(args.private_key.is_none());
        assert!(args.to_string().contains("private_key: None"));
        assert_eq!(args.node_url.as_str(), "http://127.0.0.1:8545/");
    }

    #[test]
    fn rejects_malformed_key() {
        assert!(Arguments::try_parse_from(["test", "--private-key", "0x1234"]).is_err());
    }
}
