use std::{error, fmt, io};

#[derive(Debug)]
pub enum Error {
    AuthError(Box<Error>),
    NotFoundError { query: String },
    NetworkError(Box<dyn error::Error + Send>),
    UnexpectedStatus { status: u16 },
    DecodeError(Box<dyn error::Error + Send>),
    IndexError { index: usize, len: usize },
    ConfigError(String),
    IoError(io::Error),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Auth,
    NotFound,
    Network,
    Decode,
    Index,
    Config,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthError(_) => ErrorKind::Auth,
            Self::NotFoundError { .. } => ErrorKind::NotFound,
            Self::NetworkError(_) | Self::UnexpectedStatus { .. } => ErrorKind::Network,
            Self::DecodeError(_) => ErrorKind::Decode,
            Self::IndexError { .. } => ErrorKind::Index,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::IoError(_) => ErrorKind::Io,
        }
    }

    /// The classified failure behind an authentication error, or `self`.
    pub fn cause(&self) -> &Error {
        match self {
            Self::AuthError(cause) => cause,
            other => other,
        }
    }

    /// Generic notice shown to the shopper for any catalog failure.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "No artist matched your search.",
            ErrorKind::Index => "That item is no longer in the cart.",
            _ => "Something went wrong while loading the catalog. Please try again.",
        }
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthError(cause) => write!(f, "Authentication failed: {}", cause),
            Self::NotFoundError { query } => write!(f, "No artist found for {:?}", query),
            Self::UnexpectedStatus { status } => write!(f, "Unexpected HTTP status: {}", status),
            Self::IndexError { index, len } => {
                write!(f, "Cart index {} out of bounds (len {})", index, len)
            }
            Self::ConfigError(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::NetworkError(err) | Self::DecodeError(err) => write!(f, "{}", err),
            Self::IoError(err) => write!(f, "{}", err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Error {
        match err {
            ureq::Error::StatusCode(status) => Error::UnexpectedStatus { status },
            ureq::Error::Json(err) => Error::DecodeError(Box::new(err)),
            err => Error::NetworkError(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::DecodeError(Box::new(err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_failures_are_network_errors() {
        let err = Error::from(ureq::Error::StatusCode(503));
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.to_string(), "Unexpected HTTP status: 503");
    }

    #[test]
    fn auth_error_keeps_its_cause() {
        let decode = serde_json::from_str::<u32>("{").unwrap_err();
        let err = Error::AuthError(Box::new(decode.into()));
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.cause().kind(), ErrorKind::Decode);
        assert!(err.to_string().starts_with("Authentication failed: "));
    }

    #[test]
    fn catalog_failures_share_one_notice() {
        let network = Error::UnexpectedStatus { status: 500 };
        let auth = Error::AuthError(Box::new(Error::UnexpectedStatus { status: 401 }));
        assert_eq!(network.user_message(), auth.user_message());

        let not_found = Error::NotFoundError {
            query: "nobody".to_string(),
        };
        assert_ne!(not_found.user_message(), network.user_message());
    }
}
