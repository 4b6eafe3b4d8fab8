use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncReadExt;

use wa_bulk_sender::{
    dispatcher::{BatchedDispatcher, BrowserOpener, DispatchReport, LinkOpener, PrintOpener},
    domain::{BatchSize, DispatchRequest, MessageBody, RecipientList, WA_ME_BASE_URL},
    relay_client::RelayClient,
    telemetry::{get_subscriber, init_subscriber},
};

/// Send one message to a list of phone numbers, either through chat links
/// or through a send endpoint.
#[derive(Parser)]
#[command(name = "wa-dispatch", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open one chat link per recipient in the browser, in batches.
    Links(LinksArgs),
    /// Hand the recipients to a send endpoint in a single request.
    Relay(RelayArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Text or CSV file with phone numbers, `-` for stdin.
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long)]
    message: String,
}

#[derive(Args)]
struct LinksArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, default_value_t = 10)]
    batch_size: usize,

    /// Pause between two batches, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    delay_ms: u64,

    #[arg(long, default_value = WA_ME_BASE_URL)]
    base_url: String,

    /// Print the links instead of opening them.
    #[arg(long)]
    dry_run: bool,

    /// Also write every link to this file, one per line.
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Args)]
struct RelayArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, env = "WA_SEND_ENDPOINT")]
    endpoint: String,

    #[arg(long, default_value_t = 120_000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("wa-dispatch".into(), "warn".into(), std::io::stderr);
    init_subscriber(subscriber);

    match Cli::parse().command {
        Command::Links(args) => links(args).await,
        Command::Relay(args) => relay(args).await,
    }
}

async fn links(args: LinksArgs) -> anyhow::Result<()> {
    let (list, message) = read_input(&args.input).await?;

    if let Some(path) = &args.export {
        tokio::fs::write(path, list.export_links(&args.base_url, &message))
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {} links to {}", list.len(), path.display());
    }

    let request = DispatchRequest::new(
        list.recipients(),
        message,
        BatchSize::parse(args.batch_size).map_err(anyhow::Error::msg)?,
        Duration::from_millis(args.delay_ms),
    )
    .map_err(anyhow::Error::msg)?;

    let report = if args.dry_run {
        dispatch(PrintOpener, &args.base_url, request).await?
    } else {
        dispatch(BrowserOpener, &args.base_url, request).await?
    };

    eprintln!(
        "Opened {} links in {} batches, {} failed",
        report.opened, report.batches, report.failed
    );
    Ok(())
}

async fn dispatch<O: LinkOpener>(
    opener: O,
    base_url: &str,
    request: DispatchRequest,
) -> anyhow::Result<DispatchReport> {
    let dispatcher = BatchedDispatcher::with_base_url(opener, base_url);
    let handle = dispatcher.dispatch(request);
    // Keep the process alive until the last scheduled batch has fired.
    Ok(handle.finished().await?)
}

async fn relay(args: RelayArgs) -> anyhow::Result<()> {
    let (list, message) = read_input(&args.input).await?;

    let client = RelayClient::new(args.endpoint, Duration::from_millis(args.timeout_ms));
    let summary = client.relay(list.recipients(), &message).await?;

    for result in summary.results.iter().filter(|result| !result.ok) {
        let error = result
            .error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        eprintln!("{}: {}", result.to, error);
    }
    println!("Sent {} of {} messages", summary.count, summary.results.len());
    Ok(())
}

async fn read_input(args: &InputArgs) -> anyhow::Result<(RecipientList, MessageBody)> {
    let message = MessageBody::parse(args.message.clone()).map_err(anyhow::Error::msg)?;

    let text = if args.input.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read recipients from stdin")?;
        text
    } else {
        tokio::fs::read_to_string(&args.input)
            .await
            .with_context(|| format!("Failed to read {}", args.input.display()))?
    };

    let list = RecipientList::parse(&text);
    for rejected in list.rejected() {
        eprintln!("Skipped {:?}: {}", rejected.token, rejected.reason);
    }
    eprintln!(
        "{} recipients ({} duplicates dropped)",
        list.len(),
        list.duplicates()
    );
    if list.is_empty() {
        anyhow::bail!("No valid phone numbers found");
    }

    Ok((list, message))
}
