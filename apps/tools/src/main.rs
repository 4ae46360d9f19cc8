use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use intake_core::{
    parse_quantity, HttpWebhookClient, Selection, SubmissionCoordinator, WebhookEndpoints,
};
use reference::{gviz_csv_url, load, HttpReferenceSource};
use shared::domain::PhotoFile;
use url::Url;

#[derive(Parser, Debug)]
struct Cli {
    /// Reference CSV location; overrides --sheet-id.
    #[arg(long)]
    csv_url: Option<Url>,
    #[arg(long)]
    sheet_id: Option<String>,
    #[arg(long, default_value = "Master")]
    sheet_name: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the reference index as `database / po: items`.
    Reference,
    /// Submit received quantities and photos without the web form.
    Submit {
        #[arg(long)]
        database: String,
        #[arg(long)]
        po: String,
        /// `NAME=QTY`, repeatable.
        #[arg(long = "item", value_parser = parse_item_quantity)]
        items: Vec<(String, u32)>,
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
        #[arg(long)]
        upload_url: Url,
        #[arg(long)]
        append_url: Url,
    },
}

fn parse_item_quantity(raw: &str) -> Result<(String, u32), String> {
    let (item, quantity) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=QTY, got `{raw}`"))?;
    let item = item.trim();
    if item.is_empty() {
        return Err(format!("missing item name in `{raw}`"));
    }
    let quantity = parse_quantity(item, quantity).map_err(|e| e.to_string())?;
    Ok((item.to_string(), quantity))
}

impl Cli {
    fn reference_url(&self) -> Result<Option<Url>> {
        if let Some(url) = &self.csv_url {
            return Ok(Some(url.clone()));
        }
        self.sheet_id
            .as_deref()
            .map(|sheet_id| gviz_csv_url(sheet_id, &self.sheet_name))
            .transpose()
            .context("invalid sheet id")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let reference_url = cli.reference_url()?;

    match cli.command {
        Command::Reference => {
            let Some(url) = reference_url else {
                bail!("pass --csv-url or --sheet-id");
            };
            let index = load(&HttpReferenceSource::new(url)).await?;
            for database in index.entries() {
                for po in &database.purchase_orders {
                    let items: Vec<&str> = po.items.iter().map(|item| item.as_str()).collect();
                    println!("{} / {}: {}", database.name, po.number, items.join(", "));
                }
            }
        }
        Command::Submit {
            database,
            po,
            items,
            photos,
            upload_url,
            append_url,
        } => {
            let mut selection = Selection::new(database, po);
            for (item, quantity) in items {
                selection.set_quantity(item, quantity);
            }

            if let Some(url) = reference_url {
                let index = load(&HttpReferenceSource::new(url)).await?;
                selection.check_against(&index)?;
            }

            let mut files = Vec::with_capacity(photos.len());
            for path in photos {
                let bytes = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("failed to read photo '{}'", path.display()))?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                files.push(PhotoFile::new(filename, bytes));
            }

            let webhooks = Arc::new(HttpWebhookClient::new(WebhookEndpoints {
                upload_url,
                append_url,
            }));
            let outcome = SubmissionCoordinator::new(webhooks)
                .submit(&selection, &files)
                .await;
            for line in &outcome.debug {
                println!("{line}");
            }
            if !outcome.is_done() {
                bail!(outcome.message());
            }
            println!("{}", outcome.message());
        }
    }

    Ok(())
}
