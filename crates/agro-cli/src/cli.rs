//! Command-line arguments

use agro_core::{Decimal, OrderSort, OrderStatus, PaymentMethod, ProductId, StatusFilter};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "agrofix", version, about = "Fresh-produce storefront client")]
pub struct Cli {
    /// TOML config file; environment variables override it
    #[arg(long, short = 'c', default_value = "config/agrofix.toml")]
    pub config: PathBuf,

    /// Marketplace API base URL (overrides config and AGROFIX_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List products available for purchase
    Products,

    /// Track orders placed with a phone number
    Orders {
        #[arg(long)]
        phone: String,

        #[command(flatten)]
        view: OrderViewArgs,
    },

    /// Fill a cart and place an order
    Checkout(CheckoutArgs),

    /// Admin operations (need AGROFIX_ADMIN_USERNAME / AGROFIX_ADMIN_PASSWORD)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List every order
    Orders {
        #[command(flatten)]
        view: OrderViewArgs,
    },

    /// Create a product from a JSON file
    AddProduct {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete a product
    DeleteProduct {
        #[arg(value_name = "ID")]
        id: ProductId,
    },

    /// Change an order's status (pending, confirmed, delivered)
    SetStatus {
        #[arg(value_name = "ORDER_ID")]
        order_id: i64,
        #[arg(value_name = "STATUS")]
        status: OrderStatus,
    },
}

/// Filter/sort flags shared by both order listings
#[derive(Args, Debug, Clone, Default)]
pub struct OrderViewArgs {
    /// all, pending, confirmed or delivered
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,

    /// newest, oldest, highestAmount, lowestAmount, statusAsc, statusDesc
    #[arg(long, default_value = "newest")]
    pub sort: OrderSort,
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Product and quantity, e.g. `--item 3=1.5`; repeatable
    #[arg(long = "item", value_name = "ID=QTY", required = true)]
    pub items: Vec<ItemArg>,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub address: String,

    /// "Cash on Delivery", "UPI" or "Card" (labels or tokens such as `upi`)
    #[arg(long, default_value = "Cash on Delivery")]
    pub payment: PaymentMethod,
}

/// `ID=QTY` pair from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct ItemArg {
    pub id: ProductId,
    pub quantity: Decimal,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ID=QTY, got '{}'", s))?;
        let id = id
            .parse()
            .map_err(|_| format!("invalid product id '{}'", id))?;
        let quantity = Decimal::from_str(quantity.trim())
            .map_err(|_| format!("invalid quantity '{}'", quantity))?;
        Ok(ItemArg { id, quantity })
    }
}
