use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "ergopay-cli")]
#[command(about = "Command line client for the Ergo payment verification gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "ERGOPAY_URL", default_value = "http://localhost:3001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify that a transaction pays a merchant
    Verify {
        /// Transaction id (64 hex characters)
        #[arg(long)]
        tx_id: String,
        /// Merchant address
        #[arg(long)]
        address: String,
        /// Expected amount in ERG
        #[arg(long)]
        amount: String,
    },
    /// Build a normalized payment request
    PaymentRequest {
        #[arg(long)]
        address: String,
        /// Amount in ERG
        #[arg(long)]
        amount: String,
    },
    /// Show public gateway settings
    Config,
    /// Check gateway and explorer health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Verify {
            tx_id,
            address,
            amount,
        } => {
            client
                .post(format!("{base}/api/verify-payment"))
                .json(&json!({
                    "txId": tx_id,
                    "merchantAddress": address,
                    "expectedAmount": amount,
                }))
                .send()
                .await?
        }
        Commands::PaymentRequest { address, amount } => {
            client
                .post(format!("{base}/api/payment-request"))
                .json(&json!({ "merchantAddress": address, "amount": amount }))
                .send()
                .await?
        }
        Commands::Config => client.get(format!("{base}/api/config")).send().await?,
        Commands::Health => client.get(format!("{base}/health")).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let body = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{body}");
    } else {
        eprintln!("Error: gateway returned status {status}");
        eprintln!("{body}");
        std::process::exit(1);
    }
    Ok(())
}
