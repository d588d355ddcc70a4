//! Matgar.tech CLI - order message preview and link tools.
//!
//! # Usage
//!
//! ```bash
//! # Preview the message and link for a cart order
//! matgar-cli preview --customer customer.json --cart cart.json
//!
//! # Preview a quick order for one product, in English
//! matgar-cli preview --customer customer.json --product product.json --locale en
//!
//! # Decode an existing link
//! matgar-cli decode 'https://wa.me/201557219572?text=...'
//! ```
//!
//! # Commands
//!
//! - `preview` - Validate a customer and print the order message and link
//! - `decode` - Print the recipient and message carried by a link
//!
//! `WHATSAPP_RECIPIENT`, `STOREFRONT_LOCALE` and `STOREFRONT_STORE_NAME` are
//! read from the environment (or `.env`) when the flags are omitted.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use matgar_core::{DEFAULT_STORE_NAME, Locale, RecipientId};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "matgar-cli")]
#[command(author, version, about = "Matgar.tech CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the order message and WhatsApp link for a customer
    #[command(group(ArgGroup::new("order").required(true).args(["cart", "product"])))]
    Preview {
        /// JSON file with the customer form fields
        #[arg(long)]
        customer: PathBuf,

        /// JSON file with the cart lines (multi-item order)
        #[arg(long)]
        cart: Option<PathBuf>,

        /// JSON file with a single product (quick order)
        #[arg(long)]
        product: Option<PathBuf>,

        /// Message locale (`ar-EG` or `en`)
        #[arg(long, env = "STOREFRONT_LOCALE", default_value = "ar-EG")]
        locale: Locale,

        /// WhatsApp recipient, digits only
        #[arg(long, env = "WHATSAPP_RECIPIENT")]
        recipient: Option<RecipientId>,

        /// Store name shown in the message header
        #[arg(long, env = "STOREFRONT_STORE_NAME", default_value = DEFAULT_STORE_NAME)]
        store_name: String,
    },
    /// Print the recipient and message of a wa.me link
    Decode {
        /// The link to decode
        url: String,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match &e {
            CliError::Invalid(errors) => {
                for error in errors.iter() {
                    tracing::error!(field = %error.field, "{}", error.message);
                }
            }
            _ => tracing::error!("Command failed: {e}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Preview {
            customer,
            cart,
            product,
            locale,
            recipient,
            store_name,
        } => {
            let order = match (cart, product) {
                (Some(path), _) => commands::preview::Order::Cart(path),
                (None, Some(path)) => commands::preview::Order::Product(path),
                (None, None) => return Err(CliError::MissingOrder),
            };
            let settings = commands::preview::settings(locale, recipient, store_name);
            commands::preview::run(&settings, &customer, &order)
        }
        Commands::Decode { url } => commands::decode::run(&url),
    }
}
