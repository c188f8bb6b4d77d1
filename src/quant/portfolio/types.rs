//! # Portfolio Types
//!
//! $$
//! \mathbf{w}\in\Delta^{n-1}=\{\mathbf{w}\in[0,1]^n : \textstyle\sum_i w_i = 1\}
//! $$
//!
//! Price series, aligned tables, allocations and result containers.

use chrono::NaiveDate;
use ndarray::Array2;
use ndarray::ArrayView1;
use serde::Serialize;

use super::error::ConfigError;
use super::error::PortfolioError;
use super::error::Result;

/// Tolerance used when checking that weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Daily closing prices for one instrument, strictly increasing in date.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceSeries {
  instrument: String,
  points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
  /// Build a series from raw observations in any order.
  ///
  /// Non-finite prices count as missing and are dropped. Duplicate dates and
  /// non-positive prices are rejected.
  pub fn new(instrument: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Result<Self> {
    let instrument = instrument.into();
    let mut points: Vec<(NaiveDate, f64)> = points
      .into_iter()
      .filter(|(_, price)| price.is_finite())
      .collect();

    if let Some((date, price)) = points.iter().find(|(_, price)| *price <= 0.0) {
      return Err(PortfolioError::alignment(
        Some(instrument.as_str()),
        format!("non-positive price {price} on {date}"),
      ));
    }

    points.sort_by_key(|(date, _)| *date);
    if let Some(pair) = points.windows(2).find(|w| w[0].0 == w[1].0) {
      return Err(PortfolioError::alignment(
        Some(instrument.as_str()),
        format!("duplicate observation on {}", pair[0].0),
      ));
    }

    Ok(Self { instrument, points })
  }

  pub fn instrument(&self) -> &str {
    &self.instrument
  }

  pub fn points(&self) -> &[(NaiveDate, f64)] {
    &self.points
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }
}

/// Synchronized price table: one row per date, one column per instrument.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedPriceTable {
  instruments: Vec<String>,
  dates: Vec<NaiveDate>,
  prices: Array2<f64>,
}

impl AlignedPriceTable {
  /// Build a table from already aligned data.
  ///
  /// Dates must be strictly ascending and every price finite and positive.
  pub fn new(instruments: Vec<String>, dates: Vec<NaiveDate>, prices: Array2<f64>) -> Result<Self> {
    if instruments.is_empty() {
      return Err(PortfolioError::alignment(None, "table has no instruments"));
    }
    if dates.is_empty() {
      return Err(PortfolioError::alignment(None, "table has no rows"));
    }
    if prices.dim() != (dates.len(), instruments.len()) {
      return Err(PortfolioError::alignment(
        None,
        format!(
          "price matrix is {:?}, expected ({}, {})",
          prices.dim(),
          dates.len(),
          instruments.len()
        ),
      ));
    }
    if dates.windows(2).any(|w| w[0] >= w[1]) {
      return Err(PortfolioError::alignment(None, "dates must be strictly ascending"));
    }
    for (column, instrument) in prices.columns().into_iter().zip(instruments.iter()) {
      if column.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return Err(PortfolioError::alignment(
          Some(instrument.as_str()),
          "prices must be finite and positive",
        ));
      }
    }

    Ok(Self {
      instruments,
      dates,
      prices,
    })
  }

  pub fn instruments(&self) -> &[String] {
    &self.instruments
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Price matrix with shape `(dates, instruments)`.
  pub fn prices(&self) -> &Array2<f64> {
    &self.prices
  }

  pub fn n_rows(&self) -> usize {
    self.dates.len()
  }

  pub fn n_instruments(&self) -> usize {
    self.instruments.len()
  }

  /// Prices of one instrument by column index.
  pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
    self.prices.column(index)
  }
}

/// Allocation weights in instrument order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Allocation(Vec<f64>);

impl Allocation {
  /// Validate weights: each in `[0, 1]`, summing to one within [`WEIGHT_SUM_TOLERANCE`].
  pub fn new(weights: Vec<f64>) -> std::result::Result<Self, ConfigError> {
    if weights.is_empty() {
      return Err(ConfigError::Allocation("allocation is empty".into()));
    }
    if let Some(w) = weights
      .iter()
      .find(|w| !w.is_finite() || **w < 0.0 || **w > 1.0)
    {
      return Err(ConfigError::Allocation(format!("weight {w} outside [0, 1]")));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(ConfigError::Allocation(format!("weights sum to {sum}, expected 1")));
    }
    Ok(Self(weights))
  }

  /// Equal weights `1/n`.
  pub fn uniform(n: usize) -> Self {
    Self(vec![1.0 / n as f64; n])
  }

  pub fn weights(&self) -> &[f64] {
    &self.0
  }

  pub fn view(&self) -> ArrayView1<'_, f64> {
    ArrayView1::from(&self.0[..])
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn into_inner(self) -> Vec<f64> {
    self.0
  }
}

/// Portfolio value per date.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortfolioValueSeries {
  dates: Vec<NaiveDate>,
  values: Vec<f64>,
}

impl PortfolioValueSeries {
  pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
    if dates.len() != values.len() {
      return Err(PortfolioError::DegenerateSeries(format!(
        "{} dates but {} values",
        dates.len(),
        values.len()
      )));
    }
    Ok(Self { dates, values })
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn values(&self) -> &[f64] {
    &self.values
  }

  pub fn view(&self) -> ArrayView1<'_, f64> {
    ArrayView1::from(&self.values[..])
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// Return statistics of a portfolio value series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReturnStatistics {
  /// `v[last] / v[first] - 1`.
  pub cumulative_return: f64,
  /// Mean of the daily returns, including the leading zero.
  pub average_daily_return: f64,
  /// Sample standard deviation of the daily returns.
  pub volatility: f64,
  /// `sqrt(periods_per_year) * average / volatility`.
  pub sharpe_ratio: f64,
}

impl ReturnStatistics {
  /// Statistics as `(name, value)` pairs.
  pub fn named(&self) -> [(&'static str, f64); 4] {
    [
      ("cumulative_return", self.cumulative_return),
      ("average_daily_return", self.average_daily_return),
      ("volatility", self.volatility),
      ("sharpe_ratio", self.sharpe_ratio),
    ]
  }
}

/// Output of a Sharpe-ratio optimization run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizationOutcome {
  /// Optimal weights.
  pub allocation: Allocation,
  /// Sharpe ratio achieved by `allocation`; `None` when it is undefined for the
  /// single-instrument shortcut.
  pub sharpe_ratio: Option<f64>,
  /// Solver iterations performed; zero when the solver was skipped.
  pub iterations: u64,
  /// Whether the iterative solver ran at all.
  pub solver_invoked: bool,
}
