use {
    super::Context,
    crate::infra::cli::TransactionsCommand,
    anyhow::Result,
    model::transaction::TransactionRecord,
};

pub fn run(ctx: &Context, command: TransactionsCommand) -> Result<()> {
    match command {
        TransactionsCommand::List { all } => {
            let records = if all {
                ctx.log.list()?
            } else {
                ctx.log.visible()?
            };
            if records.is_empty() {
                println!("no transactions");
            }
            for record in &records {
                println!("{}", line(record));
            }
            Ok(())
        }
        TransactionsCommand::Clear => {
            ctx.log.clear()?;
            println!("transaction log cleared");
            Ok(())
        }
    }
}

fn line(record: &TransactionRecord) -> String {
    let tx = record
        .tx_hash
        .map(|hash| hash.to_string())
        .unwrap_or_else(|| "-".to_owned());
    format!(
        "{}  {:<9} {} {}  {} -> {}  {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.status,
        record.amount,
        record.token,
        record.from,
        record.to,
        tx
    )
}
