use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Zabbix(#[from] ZbxError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("missing required configuration field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

/// Failures of a Zabbix API exchange, split by where they originated.
#[derive(Debug, Error)]
pub enum ZbxError {
    /// The login call was rejected or could not be completed.
    #[error("authentication failed: {message}")]
    Auth {
        code: Option<i64>,
        message: String,
        data: Option<String>,
        #[source]
        source: Option<Box<ZbxError>>,
    },
    /// The API answered a non-login method with an `error` object.
    #[error("Zabbix API error {code}: {message}{}", format_data(.data.as_deref()))]
    Api {
        code: i64,
        message: String,
        data: Option<String>,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("request timed out")]
    Timeout {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: reqwest::StatusCode },
    #[error("transport failure: {message}")]
    Other { message: String },
}

/// The response could not be interpreted as an envelope or an expected shape.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON payload: {message}")]
    Json { message: String },
    #[error("missing field in API response: {field}")]
    MissingField { field: String },
    #[error("invalid field {field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("unexpected result shape: expected {expected}, got {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
}

fn format_data(data: Option<&str>) -> String {
    data.filter(|d| !d.is_empty())
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl From<reqwest::Error> for TransportError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { source };
        }
        if source.is_status() {
            if let Some(status) = source.status() {
                return Self::HttpStatus { status };
            }
        }
        Self::Request { source }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Self::Zabbix(ZbxError::Transport(err))
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Self::Zabbix(ZbxError::Protocol(err))
    }
}

impl Error {
    /// Transient transport failures a caller may choose to retry.
    ///
    /// The client itself never retries.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Zabbix(ZbxError::Transport(err)) => match err {
                TransportError::Request { .. } | TransportError::Timeout { .. } => true,
                TransportError::HttpStatus { status } => {
                    status.is_server_error() || *status == reqwest::StatusCode::REQUEST_TIMEOUT
                }
                TransportError::Client { .. } | TransportError::Other { .. } => false,
            },
            _ => false,
        }
    }

    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Zabbix(ZbxError::Auth { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ProtocolError, TransportError, ZbxError};

    #[test]
    fn api_error_display_includes_data() {
        let err = ZbxError::Api {
            code: -32602,
            message: "Invalid params.".to_string(),
            data: Some("Host group \"Linux servers\" already exists.".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("-32602"));
        assert!(text.ends_with("(Host group \"Linux servers\" already exists.)"));
    }

    #[test]
    fn server_errors_are_retriable_but_api_errors_are_not() {
        let transient = Error::from(TransportError::HttpStatus {
            status: reqwest::StatusCode::BAD_GATEWAY,
        });
        assert!(transient.is_retriable());

        let not_found = Error::from(TransportError::HttpStatus {
            status: reqwest::StatusCode::NOT_FOUND,
        });
        assert!(!not_found.is_retriable());

        let api = Error::Zabbix(ZbxError::Api {
            code: 1,
            message: "nope".to_string(),
            data: None,
        });
        assert!(!api.is_retriable());
        assert!(!Error::from(ProtocolError::MissingField {
            field: "result".to_string()
        })
        .is_retriable());
    }

    #[test]
    fn auth_errors_are_flagged() {
        let err = Error::Zabbix(ZbxError::Auth {
            code: Some(-32602),
            message: "Login name or password is incorrect".to_string(),
            data: None,
            source: None,
        });
        assert!(err.is_auth());
        assert_eq!(
            err.to_string(),
            "authentication failed: Login name or password is incorrect"
        );
    }
}
