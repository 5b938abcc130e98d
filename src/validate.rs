use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};

use crate::config::Inputs;
use crate::error::{Result, TootError};
use crate::types::{StatusRequest, Visibility};

/// Format accepted for `scheduled-at`.
pub(crate) const SCHEDULED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Mastodon refuses to schedule anything sooner than this.
pub(crate) fn min_schedule_lead() -> Duration {
    Duration::minutes(5)
}

/// A request ready to send, along with where to send it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Submission {
    pub url: String,
    pub access_token: String,
    pub request: StatusRequest,
}

pub(crate) fn validate(inputs: Inputs, now: DateTime<Utc>) -> Result<Submission> {
    if inputs.message.trim().is_empty() {
        return Err(TootError::Validation(
            "status message cannot be empty".to_string(),
        ));
    }

    let visibility = match inputs.visibility.as_deref() {
        None => Visibility::default(),
        Some(v) => v.parse().map_err(TootError::Validation)?,
    };

    let scheduled_at = match inputs.scheduled_at.as_deref() {
        None => String::new(),
        Some(s) => parse_scheduled_at(s, now)?,
    };

    let status = match inputs.max_length {
        Some(0) => {
            return Err(TootError::Validation(
                "max-length must be at least 1".to_string(),
            ))
        }
        Some(max) => truncate(inputs.message, max),
        None => inputs.message,
    };

    Ok(Submission {
        url: inputs.url,
        access_token: inputs.access_token,
        request: StatusRequest {
            status,
            visibility,
            sensitive: inputs.sensitive,
            spoiler_text: inputs.spoiler_text.unwrap_or_default(),
            language: inputs.language.unwrap_or_default(),
            scheduled_at,
        },
    })
}

/// Turns `YYYY-MM-DD HH:MM` (UTC) into the RFC 3339 form the API expects.
pub(crate) fn parse_scheduled_at(input: &str, now: DateTime<Utc>) -> Result<String> {
    let at = NaiveDateTime::parse_from_str(input, SCHEDULED_AT_FORMAT)
        .map_err(|e| {
            TootError::Validation(format!(
                "invalid date format {input:?}, expected YYYY-MM-DD HH:MM: {e}"
            ))
        })?
        .and_utc();

    if at - now < min_schedule_lead() {
        return Err(TootError::Scheduling(format!(
            "scheduled time {input} must be at least 5 minutes in the future"
        )));
    }

    Ok(at.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn truncate(message: String, max: usize) -> String {
    if message.chars().count() <= max {
        return message;
    }
    let mut cut: String = message.chars().take(max - 1).collect();
    cut.push('…');
    cut
}
