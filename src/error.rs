use thiserror::Error;

pub type Result<T> = std::result::Result<T, TootError>;

#[derive(Error, Debug)]
pub enum TootError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("scheduled at error: {0}")]
    Scheduling(String),

    #[error("API call error")]
    Transport(#[source] reqwest::Error),

    #[error("API response: {status}, Body: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("reading response body error")]
    Io(#[source] reqwest::Error),

    #[error("unmarshaling {shape} response error")]
    Decode {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl TootError {
    /// Bad input exits with 2, like a usage error; everything past the
    /// point where a request was attempted exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            TootError::Validation(_) | TootError::Scheduling(_) => 2,
            TootError::Transport(_)
            | TootError::Api { .. }
            | TootError::Io(_)
            | TootError::Decode { .. } => 1,
        }
    }
}
