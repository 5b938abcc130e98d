use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
}

impl Visibility {
    pub const ALL: [Visibility; 4] = [
        Visibility::Public,
        Visibility::Unlisted,
        Visibility::Private,
        Visibility::Direct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
            Visibility::Direct => "direct",
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    // Exact match only: "Public" is not a visibility
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Visibility::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "invalid visibility {s:?}, \
                     expected one of: public, unlisted, private, direct"
                )
            })
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(b: &bool) -> bool {
    !b
}

/// Body of `POST /api/v1/statuses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "is_false")]
    pub sensitive: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spoiler_text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    /// RFC 3339 timestamp, or empty for an immediate post.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scheduled_at: String,
}

impl StatusRequest {
    /// Whether the server will answer with a scheduled status rather than a
    /// posted one. Only a normalized timestamp carries the `T` separator.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_at.contains('T')
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusResponse {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub visibility: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduledStatusResponse {
    pub id: String,
    pub scheduled_at: DateTime<Utc>,
}

/// What the instance did with our status.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Posted(StatusResponse),
    Scheduled(ScheduledStatusResponse),
}

impl Outcome {
    /// Key/value pairs handed back to the pipeline.
    pub fn outputs(&self) -> Vec<(&'static str, String)> {
        match self {
            Outcome::Posted(s) => vec![("id", s.id.clone()), ("url", s.url.clone())],
            Outcome::Scheduled(s) => vec![
                ("id", s.id.clone()),
                (
                    "scheduled_at",
                    s.scheduled_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                ),
            ],
        }
    }
}

/// Build metadata, fixed at compile time and read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub revision: &'static str,
    pub build_time: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        BuildInfo {
            version: env!("CARGO_PKG_VERSION"),
            revision: option_env!("TOOT_GIT_REVISION").unwrap_or("unknown"),
            build_time: option_env!("TOOT_BUILD_TIME").unwrap_or("unknown"),
        }
    }

    pub fn user_agent(&self) -> String {
        format!("toot-action v{}", self.version)
    }
}
