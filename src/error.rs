use std::fmt;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    /// The appliance answered `success: false` for the named action.
    Rejected { action: String },
    /// Response body did not match the expected shape.
    Payload(String),
    /// Manual pairing attempted against an already-registered address.
    AlreadyAdded(String),
    /// The session was disposed; no further activity is possible.
    Disposed,
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Rejected { action } => write!(f, "appliance rejected {action}"),
            Error::Payload(msg) => write!(f, "unexpected payload: {msg}"),
            Error::AlreadyAdded(ip) => write!(f, "device at {ip} is already added"),
            Error::Disposed => write!(f, "session disposed"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
