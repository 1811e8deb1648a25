//! `show`: print the merged configuration.

use std::io::Write;

use anyhow::{Context, Result};
use serde_json::Value;
use typo3_config_loader::Environment;

use super::{LoadOptions, load};
use crate::args::ShowFormat;

pub fn run(environment: Environment, cached: bool, output: ShowFormat) -> Result<()> {
    let loaded = load(
        environment,
        LoadOptions {
            cached,
            solr: false,
        },
    )?;
    let config = loaded.store.into_value().unwrap_or(Value::Null);

    let rendered = render(&config, output)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .context("Failed to write to stdout")?;

    Ok(())
}

fn render(config: &Value, output: ShowFormat) -> Result<String> {
    match output {
        ShowFormat::Json => {
            let mut rendered =
                serde_json::to_string_pretty(config).context("Failed to render JSON")?;
            rendered.push('\n');
            Ok(rendered)
        }
        ShowFormat::Yaml => serde_yaml::to_string(config).context("Failed to render YAML"),
    }
}
