use {
    super::Context,
    crate::domain::pools::{ensure, setup, verify},
    anyhow::{Context as _, Result},
    serde::Serialize,
    std::path::{Path, PathBuf},
};

/// Writes `report` as pretty JSON to `dir/file`.
async fn write_report(dir: &Path, file: &str, report: &impl Serialize) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {dir:?}"))?;
    let path = dir.join(file);
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("failed to write {path:?}"))?;
    tracing::info!(?path, "report written");
    Ok(path)
}

pub async fn setup(ctx: &Context, report_dir: &Path) -> Result<()> {
    let operator = ctx.operator()?;
    ctx.ensure_chain().await?;
    let tokens = ctx.registry.list()?;
    let entries = setup::setup(operator, &tokens).await?;
    for entry in &entries {
        let outcome = |ok: bool| if ok { "ok" } else { "failed" };
        println!(
            "{} pool {} reserves {:?} swap a->b {} b->a {}",
            entry.pair,
            entry.pool_address,
            entry.reserves,
            outcome(entry.swap_test.a_to_b),
            outcome(entry.swap_test.b_to_a)
        );
    }
    let path = write_report(report_dir, setup::REPORT_FILE, &entries).await?;
    println!("report written to {}", path.display());
    Ok(())
}

pub async fn ensure(ctx: &Context, report_dir: &Path) -> Result<()> {
    let operator = ctx.operator()?;
    ctx.ensure_chain().await?;
    let tokens = ctx.registry.list()?;
    let report = ensure::ensure(operator, &tokens).await;
    for symbol in &report.unfunded {
        println!("could not top up the balance of {symbol}");
    }
    for entry in &report.entries {
        match &entry.error {
            Some(error) => println!("{}: failed: {error}", entry.pair),
            None => println!("{}: reserves {:?}", entry.pair, entry.reserves),
        }
    }
    let path = write_report(report_dir, ensure::REPORT_FILE, &report.entries).await?;
    println!(
        "{} successful, {} failed; report written to {}",
        report.successful(),
        report.failed(),
        path.display()
    );
    Ok(())
}

pub async fn verify(ctx: &Context, expected: &str, report_dir: &Path) -> Result<()> {
    ctx.ensure_chain().await?;
    let tokens = ctx.registry.list()?;
    let entries = verify::verify(ctx.chain.as_ref(), ctx.chain.as_ref(), &tokens, expected).await;
    for entry in &entries {
        match &entry.reserves {
            Some(reserves) => println!("{}: {} {:?}", entry.pair, entry.status, reserves),
            None => println!("{}: {}", entry.pair, entry.status),
        }
    }
    let path = write_report(report_dir, verify::REPORT_FILE, &entries).await?;
    let (correct, total) = verify::summary(&entries);
    println!(
        "{correct}/{total} pools hold the expected reserves; report written to {}",
        path.display()
    );
    Ok(())
}
