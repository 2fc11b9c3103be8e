//! Section/key/value view over the TOML configuration files.
//!
//! `update` is a destructive rewrite: the whole file is loaded, one key is
//! replaced and the whole document is serialised back. It is not safe for
//! concurrent writers.

use crate::config::error::ConfigError;
use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use toml::{Table, Value};

pub type ConfigSection = BTreeMap<String, String>;
pub type ConfigSections = BTreeMap<String, ConfigSection>;

/// Read every section of `path` as string key/value pairs.
pub fn read(path: &Path) -> Result<ConfigSections, ConfigError> {
    let table = load_table(path)?;

    table
        .into_iter()
        .map(|(section, value)| match value {
            Value::Table(entries) => {
                let entries = entries
                    .into_iter()
                    .map(|(key, value)| (key, render_value(value)))
                    .collect();
                Ok((section, entries))
            }
            _ => Err(ConfigError::parse_error(format!(
                "top level key '{}' in '{}' is not a section",
                section,
                path.display()
            ))),
        })
        .collect()
}

/// Set `[section] key = value` in `path`, rewriting the file.
///
/// The section must already exist; the key is inserted if it is absent.
pub fn update(path: &Path, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
    let mut table = load_table(path)?;

    let entries = table
        .get_mut(section)
        .and_then(Value::as_table_mut)
        .ok_or_else(|| ConfigError::missing_section(path, section))?;
    entries.insert(key.to_string(), Value::String(value.to_string()));

    let rendered = toml::to_string(&table)?;
    fs::write(path, rendered)?;

    info!(
        "Key '{}' of section '{}' in file '{}' updated with new value '{}'.",
        key,
        section,
        path.display(),
        value
    );
    Ok(())
}

fn load_table(path: &Path) -> Result<Table, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::incorrect_path(path));
    }
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str::<Table>(&contents)?)
}

fn render_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
