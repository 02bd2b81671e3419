//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod coupons;
pub mod product;
pub mod search;

use clap::{Args, Subcommand};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// URL query string, e.g. "brand=Arc,Form&minPrice=30&sortBy=price-low-high".
    #[arg(default_value = "")]
    pub query: String,

    /// Show at most N products (default: search.default_limit).
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    /// Product ID.
    pub id: String,

    /// Selected color.
    #[arg(long)]
    pub color: Option<String>,

    /// Selected size.
    #[arg(long)]
    pub size: Option<String>,
}

/// Arguments for the coupons command.
#[derive(Args)]
pub struct CouponsArgs {
    #[command(subcommand)]
    pub command: CouponsCommand,
}

#[derive(Subcommand)]
pub enum CouponsCommand {
    /// List all coupons.
    List,
    /// Check a code against a subtotal.
    Check {
        /// Coupon code (case-insensitive).
        code: String,

        /// Order subtotal in the catalog currency.
        #[arg(short, long)]
        subtotal: f64,

        /// Evaluate at this RFC 3339 time instead of now.
        #[arg(long)]
        at: Option<String>,
    },
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    /// Cart script (JSON or TOML) with a list of steps.
    pub script: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated).
        key: String,
    },
    /// Set a config value.
    Set {
        /// Config key (dot-separated).
        key: String,
        /// Value to set.
        value: String,
    },
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
