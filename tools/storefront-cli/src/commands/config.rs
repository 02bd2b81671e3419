//! Configuration management commands.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, StorefrontConfig, CONFIG_FILE_NAMES};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Set { key, value } => set_config(&key, &value, ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    ctx.output.info("[data]");
    ctx.output.kv(
        "catalog",
        ctx.config
            .data
            .catalog
            .as_deref()
            .unwrap_or("(built-in demo catalog)"),
    );

    ctx.output.info("[search]");
    ctx.output
        .kv("default_limit", &ctx.config.search.default_limit.to_string());

    ctx.output.info("[logging]");
    ctx.output.kv("level", &ctx.config.logging.level);

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = get_config_value(&ctx.config, key)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }

    Ok(())
}

fn set_config(key: &str, value: &str, ctx: &Context) -> Result<()> {
    let config_path = match &ctx.config_path {
        Some(path) => path.clone(),
        None => find_config_file(ctx)?,
    };

    let mut config = StorefrontConfig::load(&config_path)?;
    set_config_value(&mut config, key, value)?;
    config.save(&config_path)?;

    ctx.output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_FILE_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check_config(&ctx.config);
    let mut errors = errors;

    // The catalog must load and pass its own validation.
    if ctx.config.data.catalog.is_some() {
        match ctx.catalog() {
            Ok(catalog) => ctx.output.kv(
                "catalog",
                &format!(
                    "{} products, {} categories, {} coupons",
                    catalog.products.len(),
                    catalog.categories.len(),
                    catalog.coupons.len()
                ),
            ),
            Err(e) => errors.push(format!("data.catalog: {:#}", e)),
        }
    }

    // Print results
    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Static checks that need no I/O. Returns `(errors, warnings)`.
fn check_config(config: &StorefrontConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if config.search.default_limit == 0 {
        errors.push("search.default_limit must be at least 1".to_string());
    } else if config.search.default_limit > 500 {
        warnings.push(format!(
            "search.default_limit {} will print very long tables",
            config.search.default_limit
        ));
    }

    if let Err(e) = tracing_subscriber::EnvFilter::try_new(&config.logging.level) {
        errors.push(format!("logging.level '{}': {}", config.logging.level, e));
    }

    if let Some(path) = &config.data.catalog {
        let ext = PathBuf::from(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);
        if !matches!(ext.as_deref(), Some("json") | Some("toml")) {
            warnings.push(format!(
                "data.catalog '{}' has no .json or .toml extension; it will be read as TOML",
                path
            ));
        }
    }

    (errors, warnings)
}

fn get_config_value(config: &StorefrontConfig, key: &str) -> Result<String> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["data", "catalog"] => Ok(config
            .data
            .catalog
            .as_ref()
            .map(|c| format!("\"{}\"", c))
            .unwrap_or_else(|| "null".to_string())),
        ["search", "default_limit"] => Ok(config.search.default_limit.to_string()),
        ["logging", "level"] => Ok(format!("\"{}\"", config.logging.level)),
        _ => bail!("Unknown config key: {}", key),
    }
}

fn set_config_value(config: &mut StorefrontConfig, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["data", "catalog"] if value.is_empty() => config.data.catalog = None,
        ["data", "catalog"] => config.data.catalog = Some(value.to_string()),
        ["search", "default_limit"] => config.search.default_limit = value.parse()?,
        ["logging", "level"] => config.logging.level = value.to_string(),
        _ => bail!("Unknown or read-only config key: {}", key),
    }

    Ok(())
}

fn find_config_file(ctx: &Context) -> Result<PathBuf> {
    for name in &CONFIG_FILE_NAMES {
        let path = ctx.cwd.join(name);
        if path.exists() {
            return Ok(path);
        }
    }
    bail!("No config file found. Run `storefront config init` to create one.")
}
