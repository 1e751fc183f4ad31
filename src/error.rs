use std::fmt::Display;

use x509_parser::error::X509Error;

pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ChainError {
    /// Empty or missing leaf certificate, or a malformed option value.
    InvalidInput(String),
    /// Bytes that are neither PEM nor DER encoded X.509 / PKCS#7.
    UnknownFormat(String),
    /// Discovery found no candidates, or verification produced no chain.
    NoChainFound(String),
    Fetch(String),
    Bundle(String),
    /// Path validation rejected the candidates. Carries OpenSSL's diagnostic.
    Verification(String),
    IO(String),
    SSL(String),
    X509(String),
}

impl ChainError {
    /// Errors caused by what the caller handed in, as opposed to the network,
    /// the trust store or the crypto library.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ChainError::InvalidInput(_) | ChainError::UnknownFormat(_) | ChainError::NoChainFound(_)
        )
    }
}

impl Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::InvalidInput(msg)
            | ChainError::UnknownFormat(msg)
            | ChainError::NoChainFound(msg)
            | ChainError::Fetch(msg)
            | ChainError::Bundle(msg) => write!(f, "{msg}"),
            ChainError::Verification(msg) => write!(f, "Failed to verify and build chain: {msg}"),
            ChainError::IO(msg) => write!(f, "I/O error: {msg}"),
            ChainError::SSL(msg) => write!(f, "OpenSSL error: {msg}"),
            ChainError::X509(msg) => write!(f, "X.509 parsing error: {msg}"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IO(format!("{err}"))
    }
}

impl From<openssl::error::ErrorStack> for ChainError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        ChainError::SSL(format!("{err}"))
    }
}

impl From<X509Error> for ChainError {
    fn from(err: x509_parser::error::X509Error) -> Self {
        ChainError::X509(format!("{err}"))
    }
}

impl From<x509_parser::nom::Err<X509Error>> for ChainError {
    fn from(err: x509_parser::nom::Err<X509Error>) -> Self {
        ChainError::X509(format!("{err}"))
    }
}
