//! Storefront CLI - browse the catalog, check coupons and replay carts.
//!
//! Commands:
//! - `storefront search` - Filter and sort the catalog with a URL query string
//! - `storefront product` - Show variant-resolved pricing for one product
//! - `storefront coupons` - List coupons or check one against a subtotal
//! - `storefront cart` - Replay a cart script and print the totals
//! - `storefront config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{CartArgs, ConfigArgs, CouponsArgs, ProductArgs, SearchArgs};

/// Storefront CLI - query the catalog and exercise the cart from a terminal
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and sort the catalog
    Search(SearchArgs),

    /// Show one product with variant pricing
    Product(ProductArgs),

    /// Inspect coupon codes
    Coupons(CouponsArgs),

    /// Replay a cart script
    Cart(CartArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Install the subscriber. `STOREFRONT_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("STOREFRONT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        ctx.config.logging.level.as_str()
    };
    init_tracing(level);

    // Execute command
    let result = match cli.command {
        Commands::Search(args) => commands::search::run(args, &ctx),
        Commands::Product(args) => commands::product::run(args, &ctx),
        Commands::Coupons(args) => commands::coupons::run(args, &ctx),
        Commands::Cart(args) => commands::cart::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
