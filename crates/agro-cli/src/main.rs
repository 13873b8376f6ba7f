//! # Agrofix
//!
//! Fresh-produce storefront client.
//!
//! ## Usage
//!
//! ```bash
//! # Optional: point at another backend
//! export AGROFIX_API_URL=http://localhost:5000
//!
//! agrofix products
//! agrofix checkout --item 1=2 --name Asha --phone 9876543210 --address "12 Market Road"
//! ```

use agro_cli::{commands, AdminCommand, Cli, Command};
use agro_client::{AgrofixClient, ClientConfig};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let text_layer = (!cli.log_json).then(|| fmt::layer().with_writer(std::io::stderr));
    let json_layer = cli
        .log_json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let mut config = ClientConfig::load(&cli.config)?;
    if let Some(url) = cli.api_url {
        config = config.with_api_base_url(url)?;
    }
    debug!("API: {}", config.api_base_url);
    let client = AgrofixClient::new(config)?;

    let mut out = std::io::stdout().lock();
    match cli.command {
        Command::Products => commands::list_products(&client, &mut out).await?,
        Command::Orders { phone, view } => {
            commands::track_orders(&client, &phone, &view, &mut out).await?
        }
        Command::Checkout(args) => commands::checkout(&client, &args, &mut out).await?,
        Command::Admin(admin) => match admin {
            AdminCommand::Orders { view } => {
                commands::list_all_orders(&client, &view, &mut out).await?
            }
            AdminCommand::AddProduct { file } => {
                commands::add_product(&client, &file, &mut out).await?
            }
            AdminCommand::DeleteProduct { id } => {
                commands::delete_product(&client, id, &mut out).await?
            }
            AdminCommand::SetStatus { order_id, status } => {
                commands::set_status(&client, order_id, &status, &mut out).await?
            }
        },
    }

    Ok(())
}

fn print_banner() {
    eprintln!(
        r#"
  🥕 Agrofix 🥕
  ━━━━━━━━━━━━━━━━━━━━━━━
  Fresh produce, bulk orders
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
