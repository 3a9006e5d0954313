use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Unknown price field '{0}': expected one of open, high, low, close, volume")]
    UnknownField(String),
}
