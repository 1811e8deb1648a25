//! `env`: print the derived environment variables.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use typo3_config_loader::Environment;

use super::{LoadOptions, load};
use crate::args::EnvFormat;

pub fn run(environment: Environment, options: LoadOptions, output: EnvFormat) -> Result<()> {
    let loaded = load(environment, options)?;
    let vars = loaded.vars.into_vars();

    let rendered = match output {
        EnvFormat::Dotenv => render_dotenv(&vars),
        EnvFormat::Json => {
            let mut rendered =
                serde_json::to_string_pretty(&vars).context("Failed to render JSON")?;
            rendered.push('\n');
            rendered
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .context("Failed to write to stdout")?;

    Ok(())
}

/// One `KEY=value` line per variable, sorted by key.
fn render_dotenv(vars: &BTreeMap<String, String>) -> String {
    vars.iter()
        .map(|(key, value)| format!("{key}={}\n", quote(value)))
        .collect()
}

/// Values that a dotenv parser would read back differently are double-quoted.
fn quote(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_-./:@,+%".contains(c));
    if plain && !value.is_empty() {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' | '$' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
