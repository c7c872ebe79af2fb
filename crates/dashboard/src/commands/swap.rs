use {
    super::Context,
    crate::{
        domain::{
            eth::{Address, TokenOps, U256},
            swap::{self, Form, Quote, SwapStatus, Swapper, debounce::debounce},
        },
        infra::{cli::SwapCommand, observe},
    },
    anyhow::{Context as _, Result},
    tokio::{
        io::{AsyncBufReadExt, BufReader},
        sync::mpsc,
        task::JoinHandle,
    },
};

pub async fn run(ctx: &Context, command: SwapCommand) -> Result<()> {
    match command {
        SwapCommand::Quote {
            token_a,
            token_b,
            amount_a,
            amount_b,
        } => quote(ctx, token_a, token_b, amount_a, amount_b).await,
        SwapCommand::Execute {
            token_a,
            token_b,
            amount,
        } => execute(ctx, token_a, token_b, &amount).await,
        SwapCommand::Interactive { token_a, token_b } => interactive(ctx, token_a, token_b).await,
    }
}

async fn token(ctx: &Context, address: Address) -> Result<swap::Token> {
    let (symbol, decimals) =
        futures::try_join!(ctx.chain.symbol(address), ctx.chain.decimals(address))
            .with_context(|| format!("failed to read token {address}"))?;
    Ok(swap::Token {
        address,
        symbol,
        decimals,
    })
}

async fn form(ctx: &Context, token_a: Address, token_b: Address) -> Result<Form> {
    anyhow::ensure!(token_a != token_b, "token A and token B must differ");
    let (a, b) = futures::try_join!(token(ctx, token_a), token(ctx, token_b))?;
    let mut form = Form::default();
    form.select_token_a(a);
    form.select_token_b(b);
    Ok(form)
}

fn show(form: &Form) {
    let symbol = |token: &Option<swap::Token>| {
        token
            .as_ref()
            .map(|token| token.symbol.clone())
            .unwrap_or_default()
    };
    let amount = |amount: &str| (if amount.is_empty() { "-" } else { amount }).to_owned();
    println!(
        "{} {} -> {} {}",
        amount(&form.amount_a),
        symbol(&form.token_a),
        amount(&form.amount_b),
        symbol(&form.token_b)
    );
}

/// Fills the counterpart of the last edited amount.
async fn requote(ctx: &Context, form: &mut Form) -> bool {
    let quote = swap::quote(ctx.chain.as_ref(), form).await;
    form.apply(form.revision, quote)
}

async fn quote(
    ctx: &Context,
    token_a: Address,
    token_b: Address,
    amount_a: Option<String>,
    amount_b: Option<String>,
) -> Result<()> {
    let mut form = form(ctx, token_a, token_b).await?;
    let accepted = match (&amount_a, &amount_b) {
        (Some(amount), _) => form.set_amount_a(amount, None),
        (None, Some(amount)) => form.set_amount_b(amount),
        (None, None) => anyhow::bail!("pass --amount-a or --amount-b"),
    };
    anyhow::ensure!(accepted, "not a valid amount");
    requote(ctx, &mut form).await;
    show(&form);
    if form.amount_a.is_empty() || form.amount_b.is_empty() {
        println!("no quote available");
    }
    Ok(())
}

fn swapper(ctx: &Context) -> Swapper {
    Swapper::new(
        ctx.chain.clone(),
        ctx.chain.clone(),
        ctx.chain.web3().account(),
        ctx.log.clone(),
        ctx.config.swap.clone(),
    )
}

/// Follows the swapper's progress in a separate task until the swapper is
/// dropped.
fn follow_statuses(
    swapper: &Swapper,
    mut report: impl FnMut(SwapStatus) + Send + 'static,
) -> JoinHandle<()> {
    let mut status = swapper.subscribe();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            observe::swap_status(current);
            if let Some(current) = current {
                report(current);
            }
        }
    })
}

fn print_statuses(swapper: &Swapper) -> JoinHandle<()> {
    follow_statuses(swapper, |status| println!("swap: {status}"))
}

async fn execute(ctx: &Context, token_a: Address, token_b: Address, amount: &str) -> Result<()> {
    ctx.ensure_chain().await?;
    let mut form = form(ctx, token_a, token_b).await?;
    anyhow::ensure!(form.set_amount_a(amount, None), "{amount:?} is not a valid amount");
    requote(ctx, &mut form).await;
    show(&form);

    let swapper = swapper(ctx);
    let printer = print_statuses(&swapper);
    let outcome = swapper.execute(&mut form).await;
    drop(swapper);
    printer.await?;

    match outcome {
        Some(SwapStatus::Success) => Ok(()),
        Some(status) => anyhow::bail!("swap ended with status {status}"),
        None => anyhow::bail!("nothing to swap"),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    AmountA(String),
    AmountB(String),
    Switch,
    Execute,
    Quit,
}

/// `10` or `a 10` edits token A, `b 10` edits token B. An empty amount
/// clears the field.
fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim().to_owned();
    Some(match command {
        "a" => Input::AmountA(rest),
        "b" => Input::AmountB(rest),
        "switch" => Input::Switch,
        "swap" => Input::Execute,
        "quit" | "exit" => Input::Quit,
        amount if rest.is_empty() && swap::accepts(amount) && !amount.is_empty() => {
            Input::AmountA(amount.to_owned())
        }
        _ => return None,
    })
}

const HELP: &str = "enter `a <amount>`, `b <amount>`, `switch`, `swap` or `quit`";

async fn balance_a(ctx: &Context, form: &Form) -> Option<U256> {
    let account = ctx.chain.web3().account()?;
    let token = form.token_a.as_ref()?;
    ctx.chain
        .balance_of(token.address, account)
        .await
        .inspect_err(|err| tracing::debug!(?err, "failed to read input balance"))
        .ok()
}

async fn interactive(ctx: &Context, token_a: Address, token_b: Address) -> Result<()> {
    ctx.ensure_chain().await?;
    let mut form = form(ctx, token_a, token_b).await?;
    let swapper = swapper(ctx);
    let printer = print_statuses(&swapper);
    let mut balance = balance_a(ctx, &form).await;

    let (edits, edits_rx) = mpsc::unbounded_channel();
    let mut due = debounce(edits_rx, ctx.config.quote_debounce);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_input(&line) {
                    Some(Input::AmountA(amount)) => {
                        if !form.set_amount_a(&amount, balance) {
                            println!("{amount:?} is not a valid amount");
                            continue;
                        }
                    }
                    Some(Input::AmountB(amount)) => {
                        if !form.set_amount_b(&amount) {
                            println!("{amount:?} is not a valid amount");
                            continue;
                        }
                    }
                    Some(Input::Switch) => {
                        form.switch_tokens();
                        balance = balance_a(ctx, &form).await;
                        show(&form);
                    }
                    Some(Input::Execute) => {
                        swapper.execute(&mut form).await;
                        balance = balance_a(ctx, &form).await;
                        show(&form);
                        continue;
                    }
                    Some(Input::Quit) => break,
                    None => {
                        println!("{HELP}");
                        continue;
                    }
                }
                if edits.send(form.revision).is_err() {
                    break;
                }
            }
            Some(revision) = due.recv() => {
                if revision != form.revision {
                    continue;
                }
                let quote = swap::quote(ctx.chain.as_ref(), &form).await;
                if quote != Quote::Unchanged && form.apply(revision, quote) {
                    show(&form);
                }
            }
        }
    }
    drop(swapper);
    printer.await?;
    Ok(())
}
