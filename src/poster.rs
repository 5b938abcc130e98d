use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use crate::error::{Result, TootError};
use crate::types::*;

const STATUSES_PATH: &str = "/api/v1/statuses";
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(TootError::Transport)
}

/// Posts statuses to one instance on behalf of one account.
pub(crate) struct Poster {
    client: Client,
    url: String,
    access_token: String,
}

impl Poster {
    pub(crate) fn new(url: &str, access_token: &str, build: &BuildInfo) -> Result<Self> {
        Ok(Self::with_client(
            client(&build.user_agent(), REQUEST_TIMEOUT)?,
            url,
            access_token,
        ))
    }

    pub(crate) fn with_client(client: Client, url: &str, access_token: &str) -> Self {
        Poster {
            client,
            url: url.to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// Sends `request` once. The shape of a successful answer is decided by
    /// the request: a scheduled request expects a scheduled status back.
    pub(crate) fn post_status(&self, request: &StatusRequest) -> Result<Outcome> {
        // The base url is used as given, a trailing slash doubles up
        let api_url = format!("{}{STATUSES_PATH}", self.url);
        tracing::debug!(
            url = %api_url,
            visibility = %request.visibility,
            scheduled = request.is_scheduled(),
            "posting status"
        );
        let body = self
            .client
            .post(&api_url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .map_err(TootError::Transport)?
            .with_error_text()?
            .text()
            .map_err(TootError::Io)?;

        if request.is_scheduled() {
            let scheduled: ScheduledStatusResponse =
                serde_json::from_str(&body).map_err(|source| TootError::Decode {
                    shape: "scheduled",
                    source,
                })?;
            Ok(Outcome::Scheduled(scheduled))
        } else {
            let status: StatusResponse =
                serde_json::from_str(&body).map_err(|source| TootError::Decode {
                    shape: "status",
                    source,
                })?;
            Ok(Outcome::Posted(status))
        }
    }
}

trait WithErrorText {
    fn with_error_text(self) -> Result<Self>
    where
        Self: Sized;
}
impl WithErrorText for Response {
    /// Anything but 200 is an API error; its body is kept for diagnosis
    /// when it can be read.
    fn with_error_text(self) -> Result<Self> {
        let status = self.status();
        if status != StatusCode::OK {
            return Err(TootError::Api {
                status,
                body: self.text().unwrap_or_default(),
            });
        }
        Ok(self)
    }
}
