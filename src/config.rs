use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::Parser;
use serde::Deserialize;

use crate::error::TootError;

/// Post a status to a Mastodon instance and report its id and url as step outputs.
///
/// Every option can also come from its environment variable, or from the
/// `--config` file. Flags win over the environment, which wins over the file.
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub(crate) struct Args {
    /// Base URL of the instance, e.g. https://mastodon.social
    #[arg(long, env = "MASTODON_URL")]
    pub url: Option<String>,
    /// Access token with the write:statuses scope
    #[arg(long, env = "MASTODON_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
    /// Text of the status
    #[arg(long, env = "MASTODON_MESSAGE")]
    pub message: Option<String>,
    /// One of public, unlisted, private, direct [default: public]
    #[arg(long, env = "MASTODON_VISIBILITY")]
    pub visibility: Option<String>,
    /// Mark the status as sensitive
    #[arg(
        long,
        env = "MASTODON_SENSITIVE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = FalseyValueParser::new()
    )]
    pub sensitive: Option<bool>,
    /// Content warning shown before the status
    #[arg(long, env = "MASTODON_SPOILER_TEXT")]
    pub spoiler_text: Option<String>,
    /// ISO 639 language code of the status
    #[arg(long, env = "MASTODON_LANGUAGE")]
    pub language: Option<String>,
    /// Publish later, "YYYY-MM-DD HH:MM" in UTC, at least 5 minutes ahead
    #[arg(long, env = "MASTODON_SCHEDULED_AT")]
    pub scheduled_at: Option<String>,
    /// Cut longer messages to this many characters, ending with an ellipsis
    #[arg(long, env = "MASTODON_MAX_LENGTH")]
    pub max_length: Option<String>,
    /// TOML file providing any of the options above
    #[arg(long, env = "MASTODON_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Input file, keys named like the options with underscores.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileInputs {
    pub url: Option<String>,
    pub access_token: Option<String>,
    pub message: Option<String>,
    pub visibility: Option<String>,
    pub sensitive: Option<bool>,
    pub spoiler_text: Option<String>,
    pub language: Option<String>,
    pub scheduled_at: Option<String>,
    pub max_length: Option<usize>,
}

/// Every layer merged, nothing checked yet beyond presence.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Inputs {
    pub url: String,
    pub access_token: String,
    pub message: String,
    pub visibility: Option<String>,
    pub sensitive: bool,
    pub spoiler_text: Option<String>,
    pub language: Option<String>,
    pub scheduled_at: Option<String>,
    pub max_length: Option<usize>,
}

pub(crate) fn load_config(filename: &Path) -> Result<FileInputs> {
    let inputs: FileInputs = toml::from_str(
        &std::fs::read_to_string(filename)
            .with_context(|| format!("cannot read {}", filename.display()))?,
    )
    .with_context(|| format!("invalid config file {}", filename.display()))?;
    Ok(inputs)
}

// CI runners export unset inputs as empty strings
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn layered(flag: Option<String>, file: Option<String>) -> Option<String> {
    non_empty(flag).or_else(|| non_empty(file))
}

fn max_length(value: Option<String>) -> crate::error::Result<Option<usize>> {
    non_empty(value)
        .map(|v| {
            v.parse::<usize>().map_err(|e| {
                TootError::Validation(format!("invalid max-length {v:?}: {e}"))
            })
        })
        .transpose()
}

fn required(name: &str, value: Option<String>) -> crate::error::Result<String> {
    value.ok_or_else(|| TootError::Validation(format!("missing required input {name}")))
}

impl Args {
    pub(crate) fn resolve(self) -> crate::error::Result<Inputs> {
        let file = match &self.config {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading inputs file");
                load_config(path).map_err(|e| TootError::Validation(format!("{e:#}")))?
            }
            None => FileInputs::default(),
        };
        self.merge(file)
    }

    fn merge(self, file: FileInputs) -> crate::error::Result<Inputs> {
        Ok(Inputs {
            url: required("url", layered(self.url, file.url))?,
            access_token: required(
                "access-token",
                layered(self.access_token, file.access_token),
            )?,
            message: required("message", layered(self.message, file.message))?,
            visibility: layered(self.visibility, file.visibility),
            // An empty variable parses as false, which must not hide the file
            sensitive: self.sensitive.unwrap_or(false) || file.sensitive.unwrap_or(false),
            spoiler_text: layered(self.spoiler_text, file.spoiler_text),
            language: layered(self.language, file.language),
            scheduled_at: layered(self.scheduled_at, file.scheduled_at),
            max_length: max_length(self.max_length)?.or(file.max_length),
        })
    }
}
