use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("all {attempts} relays exhausted")]
    AllRelaysExhausted { attempts: usize },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no adapter chain registered for {0}")]
    MissingChain(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn parse(msg: impl Into<String>) -> Self {
        AppError::Parse(msg.into())
    }
}
