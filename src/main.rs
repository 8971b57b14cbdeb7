use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use biopsies_extractor::config::Config;
use biopsies_extractor::destination::DestinationTree;
use biopsies_extractor::gmail_client::GmailClient;
use biopsies_extractor::mail::MailClient;
use biopsies_extractor::pipeline::{BatchPipeline, PipelineOptions};

#[derive(Parser)]
#[command(name = "biopsies-extractor")]
#[command(about = "Download biopsy report attachments from Gmail into per-case folders")]
#[command(version = "0.1.0")]
struct Args {
    /// Parse subjects and report destinations without writing anything
    #[arg(short, long)]
    dry_run: bool,

    /// Root folder for attachments (overrides ATTACHMENTS_ROOT)
    #[arg(short = 'o', long)]
    attachments_root: Option<String>,

    /// Maximum number of emails to process (default: unlimited)
    #[arg(short = 'l', long)]
    limit: Option<usize>,

    /// Label to scan (overrides MAIL_LABEL)
    #[arg(long)]
    label: Option<String>,

    /// Check the configuration without connecting
    #[arg(long)]
    check_config: bool,

    /// Print the mailbox labels and exit
    #[arg(long)]
    list_labels: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env if present
    dotenv::dotenv().ok();

    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if args.dry_run {
        info!("🧪 Starting biopsies extractor in DRY-RUN mode");
    } else {
        info!("🚀 Starting biopsies extractor");
    }

    let mut config = Config::new()?;

    if let Some(root) = &args.attachments_root {
        config.set_attachments_root(root)?;
    }
    if let Some(label) = &args.label {
        config.label = label.clone();
    }

    if args.check_config {
        println!("✅ Configuration valid!");
        println!("📧 Gmail API OAuth2 (user: {})", config.gmail.user_id);
        println!("🔑 Credentials: {}", config.gmail.credentials_path);
        println!("💾 Token cache: {}", config.gmail.token_cache_path);
        println!("🏷️  Label: {}", config.label);
        println!("📁 Attachments root: {}", config.attachments_root.display());
        return Ok(());
    }

    let client = GmailClient::new(&config.gmail)
        .await
        .context("Unable to connect to Gmail API")?;

    if args.list_labels {
        return print_labels(&client).await;
    }

    let options = PipelineOptions {
        label: config.label.clone(),
        limit: args.limit,
        dry_run: args.dry_run,
    };
    let pipeline = BatchPipeline::new(
        &client,
        DestinationTree::new(config.attachments_root.clone()),
        options,
    );

    match pipeline.run().await {
        Ok(summary) => {
            if summary.listing_truncated {
                error!("⚠️  Message listing was interrupted; some emails were not considered");
            }
            if args.dry_run {
                info!(
                    "✅ Dry-run done. {} email(s) listed, {} analyzed, {} attachment(s) would be saved in {}",
                    summary.listed,
                    summary.processed,
                    summary.attachments_planned,
                    config.attachments_root.display()
                );
            } else {
                info!(
                    "✅ Done. {} email(s) listed, {} processed, {} attachment(s) saved in {}",
                    summary.listed,
                    summary.processed,
                    summary.attachments_written,
                    config.attachments_root.display()
                );
            }
            Ok(())
        }
        Err(e) => {
            error!("❌ Error while processing emails: {}", e);
            Err(e.into())
        }
    }
}

async fn print_labels(client: &GmailClient) -> Result<()> {
    let mut labels = client
        .list_labels()
        .await
        .context("Unable to list labels")?;

    if labels.is_empty() {
        println!("No labels found.");
        return Ok(());
    }

    labels.sort_by(|a, b| a.name.cmp(&b.name));

    println!("Found {} label(s):\n", labels.len());
    println!("{:<40} {:<30}", "Label Name", "Label ID");
    println!("{}", "=".repeat(70));

    for label in labels {
        println!("{:<40} {:<30}", label.name, label.id);
    }

    Ok(())
}
