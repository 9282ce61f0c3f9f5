use reqwest::Error as ReqwestError;
use reqwest_middleware::Error as MiddlewareReqwestError;

/// Statuses the query layer treats as final for the current attempt:
/// retrying them cannot succeed, so the caller sees the failure right away.
const TERMINAL_STATUSES: [u16; 4] = [401, 403, 404, 500];

#[derive(Debug)]
pub enum Error {
    ReqwestAPIError(ReqwestError),
    MiddlewareReqwestAPIError(MiddlewareReqwestError),
    ClientError(APIError),
    ServerError(APIError),
    StorageError(std::io::Error),
    SerializationError(serde_json::Error),
    ConfigError(String),
}

/// Status and message pair extracted from a non-success API response.
#[derive(Debug, Clone)]
pub struct APIError {
    pub status: u16,
    pub message: String,
}

impl std::fmt::Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Status: {}, Message: {}", self.status, self.message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &*self {
            Error::ReqwestAPIError(err) => {
                write!(f, "External API error: {}", err)
            }
            Error::MiddlewareReqwestAPIError(err) => {
                write!(f, "External API error: {}", err)
            }
            Error::ClientError(err) => {
                write!(f, "External Client error: {}", err)
            }
            Error::ServerError(err) => {
                write!(f, "External Server error: {}", err)
            }
            Error::StorageError(err) => {
                write!(f, "Cannot access persisted storage: {}", err)
            }
            Error::SerializationError(err) => {
                write!(f, "Cannot serialize stored value: {}", err)
            }
            Error::ConfigError(err) => {
                write!(f, "Invalid configuration: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// HTTP status attached to this error, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::ClientError(err) | Error::ServerError(err) => Some(err.status),
            _ => None,
        }
    }

    /// Whether the query layer should give up immediately instead of retrying.
    pub fn is_terminal(&self) -> bool {
        self.status()
            .is_some_and(|status| TERMINAL_STATUSES.contains(&status))
    }
}
