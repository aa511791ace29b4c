//! Configuration management commands.

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::{find_config_file, Context};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(ConfigCommand::Show) {
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
        Some(path) => ctx.output.info(&format!("Loaded from {}", path.display())),
        None => ctx.output.info("No config file found, using defaults"),
    }

    let upsell = &ctx.config.upsell;
    ctx.output.info("");
    ctx.output.info("[upsell]");
    ctx.output.kv("collection_handle", &upsell.collection_handle);
    ctx.output.kv("placeholder_image_url", &upsell.placeholder_image_url);
    ctx.output.kv("max_products", &upsell.max_products.to_string());
    ctx.output.kv("max_variants", &upsell.max_variants.to_string());
    ctx.output.kv("feedback_timeout_ms", &upsell.feedback_timeout_ms.to_string());
    ctx.output.kv("error_message", &upsell.error_message);
    ctx.output.kv(
        "guard_reentrant_submissions",
        &upsell.guard_reentrant_submissions.to_string(),
    );

    let logging = &ctx.config.logging;
    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output.kv("level", logging.level.as_directive());
    ctx.output.kv("format", &format!("{:?}", logging.format).to_lowercase());
    if let Some(filter) = &logging.filter {
        ctx.output.kv("filter", filter);
    }

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = ctx.config.get(key)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }

    Ok(())
}

fn set_config(key: &str, value: &str, ctx: &Context) -> Result<()> {
    let Some(path) = ctx.config_path.clone().or_else(|| find_config_file(&ctx.cwd)) else {
        bail!("No config file found. Run `upsell config init` to create one.");
    };
    let path = path.to_string_lossy().to_string();

    let mut config = CliConfig::load(&path)?;
    config.set(key, value)?;
    config.save(&path)?;

    ctx.output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.resolve_path("upsell.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, generate_default_config())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check(&ctx.config);

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

/// Collect errors and warnings for a configuration.
fn check(config: &CliConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let upsell = &config.upsell;

    if upsell.collection_handle.trim().is_empty() {
        errors.push("upsell.collection_handle is required".to_string());
    }
    if upsell.max_products == 0 {
        errors.push("upsell.max_products must be at least 1".to_string());
    }
    if upsell.max_variants == 0 {
        errors.push("upsell.max_variants must be at least 1".to_string());
    }
    if upsell.error_message.trim().is_empty() {
        errors.push("upsell.error_message must not be empty".to_string());
    }
    if upsell.feedback_timeout_ms == 0 {
        warnings.push("upsell.feedback_timeout_ms is 0, the error banner will never show".to_string());
    }
    if !upsell.placeholder_image_url.starts_with("https://")
        && !upsell.placeholder_image_url.starts_with("http://")
    {
        warnings.push(format!(
            "upsell.placeholder_image_url '{}' is not an http(s) URL",
            upsell.placeholder_image_url
        ));
    }
    if !upsell.guard_reentrant_submissions {
        warnings.push(
            "upsell.guard_reentrant_submissions is off, repeated clicks add repeated lines"
                .to_string(),
        );
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_clean() {
        let (errors, warnings) = check(&CliConfig::default());
        assert!(errors.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_reports_problems() {
        let mut config = CliConfig::default();
        config.upsell.collection_handle = " ".into();
        config.upsell.max_products = 0;
        config.upsell.placeholder_image_url = "placeholder.png".into();

        let (errors, warnings) = check(&config);
        assert_eq!(errors.len(), 2);
        assert_eq!(warnings.len(), 1);
    }
}
