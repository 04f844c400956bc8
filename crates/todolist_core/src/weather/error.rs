//! Weather lookup error taxonomy.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type WeatherResult<T> = Result<T, WeatherError>;

/// Failure of one weather fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    /// HTTP 400, or a request URL that could not be built.
    BadRequest,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 404.
    NotFound,
    /// Any other 4xx status.
    ServerError,
    /// Any other non-200 status.
    Unknown,
    /// Connection, DNS or I/O failure before a status was received.
    Transport(String),
    /// Body did not decode into the expected current-conditions shape.
    Parse { reason: String },
}

impl WeatherError {
    /// Maps a non-200 HTTP status to its error kind.
    pub fn for_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            402..=499 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
            Self::Unknown => "unknown",
            Self::Transport(_) => "transport",
            Self::Parse { .. } => "parse_error",
        }
    }
}

impl Display for WeatherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest => write!(f, "invalid weather request"),
            Self::Unauthorized => write!(f, "weather service rejected the api key"),
            Self::NotFound => write!(f, "weather resource not found"),
            Self::ServerError => write!(f, "weather service error"),
            Self::Unknown => write!(f, "unknown weather service error"),
            Self::Transport(message) => write!(f, "weather request failed: {message}"),
            Self::Parse { reason } => write!(f, "invalid weather response: {reason}"),
        }
    }
}

impl Error for WeatherError {}
