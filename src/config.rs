//! Site configuration module.
//!
//! Handles loading, validating, and merging the site configuration file.
//! Stock defaults are the base layer; an optional user file passed with
//! `--config` overrides any subset of keys.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Software Carpentry"
//! description = "Helping scientists make better software"
//! contact_email = "info@example.org"
//! twitter_name = ""
//! twitter_url = ""
//!
//! [feed]
//! history_length = 10           # Posts in the item feed
//! excerpt_length = 200          # Characters before an excerpt is cut
//! placeholder = "No description available"
//! ellipsis = " [...]"
//!
//! [calendar]
//! product_id = "-//treepress//events//EN"
//! summary_prefix = "Workshop"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [feed]
//! history_length = 20
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity, exposed to every template and to the item feed channel.
    pub site: SiteInfo,
    /// Item feed window and excerpt settings.
    pub feed: FeedConfig,
    /// Calendar feed settings.
    pub calendar: CalendarConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.history_length == 0 {
            return Err(ConfigError::Validation(
                "feed.history_length must be at least 1".into(),
            ));
        }
        if self.feed.excerpt_length == 0 {
            return Err(ConfigError::Validation(
                "feed.excerpt_length must be at least 1".into(),
            ));
        }
        if self.calendar.product_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "calendar.product_id must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub contact_email: String,
    pub twitter_name: String,
    pub twitter_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Software Carpentry".to_string(),
            description: "Helping scientists make better software".to_string(),
            contact_email: "info@example.org".to_string(),
            twitter_name: String::new(),
            twitter_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Number of most recent posts in the item feed.
    pub history_length: usize,
    /// Character budget for post excerpts.
    pub excerpt_length: usize,
    /// Excerpt used when a post has no content.
    pub placeholder: String,
    /// Appended to excerpts that were cut short.
    pub ellipsis: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            history_length: 10,
            excerpt_length: 200,
            placeholder: "No description available".to_string(),
            ellipsis: " [...]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// `PRODID` of the generated calendar.
    pub product_id: String,
    /// Leading text of each event's summary line.
    pub summary_prefix: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            product_id: "-//treepress//events//EN".to_string(),
            summary_prefix: "Workshop".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Lay a site file over the stock defaults.
///
/// A site file usually sets one or two keys (`[feed] history_length = 5`),
/// so sections are merged field by field and every field it leaves out keeps
/// its stock value. Lists and scalars are replaced whole.
pub fn merge_toml(stock: toml::Value, site: toml::Value) -> toml::Value {
    match (stock, site) {
        (toml::Value::Table(mut fields), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                let value = match fields.remove(&key) {
                    Some(default) => merge_toml(default, value),
                    None => value,
                };
                fields.insert(key, value);
            }
            toml::Value::Table(fields)
        }
        (_, site) => site,
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the site config, or the stock defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# treepress site configuration
# ============================
#
# Every key is optional. Omitted keys keep the defaults shown here.
# Unknown keys are rejected.

[site]
# Site identity, available to every template.
title = "Software Carpentry"
description = "Helping scientists make better software"
contact_email = "info@example.org"
twitter_name = ""
twitter_url = ""

[feed]
# Number of most recent posts written to the item feed.
history_length = 10
# Character budget for post excerpts. Excerpts are cut back to the last
# whole word and end with the ellipsis below.
excerpt_length = 200
# Excerpt used for posts without a content block.
placeholder = "No description available"
ellipsis = " [...]"

[calendar]
# PRODID line of the calendar feed.
product_id = "-//treepress//events//EN"
# Each event's summary reads "<prefix> at <venue>, <dates>".
summary_prefix = "Workshop"
"##
}
