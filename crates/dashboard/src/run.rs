use {
    crate::{
        commands::{self, Context},
        infra::{self, Blockchain, cli},
    },
    anyhow::{Context as _, Result},
    clap::Parser,
    shared::{registry::TokenRegistry, store::FileStore, transaction_log::TransactionLog},
    std::sync::Arc,
    tracing::Instrument,
};

pub async fn start(args: impl Iterator<Item = String>) {
    let args = cli::Args::parse_from(args);
    observe::tracing::initialize(
        &args.shared.log_filter,
        tracing::Level::ERROR,
        args.shared.use_json_logs,
    );
    tracing::info!("running dashboard with validated arguments:\n{}", args);
    if let Err(err) = run(args).await {
        tracing::error!(?err, "command failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(args: cli::Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => infra::config::file::load(path).await?,
        None => infra::Config::default(),
    };
    let store = Arc::new(
        FileStore::new(&args.shared.data_dir)
            .with_context(|| format!("failed to open data directory {:?}", args.shared.data_dir))?,
    );
    tracing::debug!(dir = ?store.dir(), "using data directory");
    let chain = Arc::new(Blockchain::new(
        args.shared.web3(),
        args.router_address,
        args.factory_address,
    ));
    let ctx = Context {
        chain,
        registry: TokenRegistry::new(store.clone()),
        log: TransactionLog::new(store.clone()),
        store,
        config,
        expected_chain: args.shared.chain_id,
        artifacts: args.artifacts,
        default_tokens: (args.token_a, args.token_b),
    };
    let name: &'static str = (&args.command).into();
    let span = tracing::info_span!("command", name);
    commands::run(&ctx, args.command).instrument(span).await
}
