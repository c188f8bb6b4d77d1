//! # Portfolio Errors
//!
//! Error taxonomy for configuration, data availability, statistics and solver failures.

use chrono::NaiveDate;
use thiserror::Error;

/// Caller-correctable problems with portfolio configuration input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
  #[error("investment must be a positive number: {0}")]
  Investment(String),

  #[error("alloc value must be a number between 0 exclusive and 1 inclusive: {0}")]
  Allocation(String),

  #[error("buy_date for {instrument} must be a date in the format of YYYY-MM-DD, got {value:?}")]
  BuyDate { instrument: String, value: String },

  #[error("optional buy_price for {instrument} must be a positive number")]
  BuyPrice { instrument: String },

  #[error("invalid instrument list: {0}")]
  Instruments(String),

  #[error("unrecognized sampling frequency: {0}")]
  Frequency(String),

  #[error("malformed portfolio document: {0}")]
  Document(String),
}

/// Errors surfaced by the portfolio analytics core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("alignment failed for {}: {reason}", .instrument.as_deref().unwrap_or("table"))]
  Alignment {
    instrument: Option<String>,
    reason: String,
  },

  #[error("no rows on or after {start} (table covers {first:?} to {last:?})")]
  EmptyRange {
    start: NaiveDate,
    first: Option<NaiveDate>,
    last: Option<NaiveDate>,
  },

  #[error("degenerate series: {0}")]
  DegenerateSeries(String),

  #[error("optimization failed after {iterations} iterations (objective {objective}): {reason}")]
  Optimization {
    reason: String,
    objective: f64,
    iterations: u64,
  },

  #[error("price provider failed for {instrument}: {message}")]
  Provider { instrument: String, message: String },
}

impl PortfolioError {
  pub(crate) fn alignment(instrument: Option<&str>, reason: impl Into<String>) -> Self {
    Self::Alignment {
      instrument: instrument.map(str::to_string),
      reason: reason.into(),
    }
  }
}

/// Result alias for portfolio operations.
pub type Result<T> = std::result::Result<T, PortfolioError>;
