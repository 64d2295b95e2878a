//! Operator CLI for a running archive gate.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Management CLI for the archive gate", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8088", env = "ARCHIVE_GATE_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check usage health and active alerts
    Status,
    /// Show rate limiter usage and the daily ledger
    Stats,
    /// Submit a URL for archiving
    Archive {
        url: String,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Personal note
        #[arg(short, long, default_value = "")]
        note: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/health", base)).send().await?,
        Commands::Stats => client.get(format!("{}/stats", base)).send().await?,
        Commands::Archive { url, tags, note } => {
            client
                .post(format!("{}/archive", base))
                .json(&json!({ "url": url, "tags": tags, "note": note }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let retry_after = res
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // The gate answers with a JSON body on every status it produces.
    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        eprintln!("Gate returned status {}", status);
        if let Some(secs) = retry_after {
            eprintln!("Retry after {}s", secs);
        }
        std::process::exit(1);
    }
    Ok(())
}
