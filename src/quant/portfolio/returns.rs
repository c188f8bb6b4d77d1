//! # Return Statistics
//!
//! $$
//! r_t = \frac{V_t}{V_{t-1}} - 1,\qquad S = \sqrt{P}\,\frac{\bar r}{\hat\sigma_r}
//! $$
//!
//! Daily returns, cumulative return, volatility, Sharpe ratio and Bollinger bands
//! of a portfolio value series. The first daily return is defined as zero and
//! takes part in the mean and standard deviation.

use ndarray::Array1;
use ndarray::ArrayView1;
use serde::Serialize;

use super::error::ConfigError;
use super::error::PortfolioError;
use super::error::Result;
use super::types::PortfolioValueSeries;
use super::types::ReturnStatistics;

/// Sampling periods per year for daily data.
pub const DAILY: u32 = 252;
/// Sampling periods per year for weekly data.
pub const WEEKLY: u32 = 52;
/// Sampling periods per year for annual data.
pub const ANNUALLY: u32 = 1;

const MIN_VOLATILITY: f64 = 1e-15;

/// Resolve a frequency name (`daily`, `weekly`, `annually`) to periods per year.
pub fn periods_per_year(name: &str) -> std::result::Result<u32, ConfigError> {
  match name.trim().to_lowercase().as_str() {
    "daily" => Ok(DAILY),
    "weekly" => Ok(WEEKLY),
    "annually" | "annual" | "yearly" => Ok(ANNUALLY),
    other => Err(ConfigError::Frequency(other.to_string())),
  }
}

/// Period-over-period returns with `r[0] = 0`.
pub fn daily_returns(values: ArrayView1<'_, f64>) -> Array1<f64> {
  let mut out = Array1::<f64>::zeros(values.len());
  for i in 1..values.len() {
    out[i] = values[i] / values[i - 1] - 1.0;
  }
  out
}

/// Statistics of a raw value curve; shared by [`analyze`] and the optimizer objective.
pub(crate) fn statistics(
  values: ArrayView1<'_, f64>,
  periods_per_year: u32,
) -> Result<ReturnStatistics> {
  if periods_per_year == 0 {
    return Err(ConfigError::Frequency("periods per year must be positive".into()).into());
  }
  let n = values.len();
  if n < 2 {
    return Err(PortfolioError::DegenerateSeries(format!(
      "need at least 2 values, got {n}"
    )));
  }

  let returns = daily_returns(values);
  let cumulative_return = values[n - 1] / values[0] - 1.0;
  let average_daily_return = returns.mean().unwrap_or(f64::NAN);
  let volatility = returns.std(1.0);

  if !volatility.is_finite() || volatility <= MIN_VOLATILITY {
    return Err(PortfolioError::DegenerateSeries(format!(
      "volatility {volatility} leaves the Sharpe ratio undefined"
    )));
  }

  let sharpe_ratio = (periods_per_year as f64).sqrt() * (average_daily_return / volatility);
  if !cumulative_return.is_finite() || !sharpe_ratio.is_finite() {
    return Err(PortfolioError::DegenerateSeries(
      "non-finite return statistics".into(),
    ));
  }

  Ok(ReturnStatistics {
    cumulative_return,
    average_daily_return,
    volatility,
    sharpe_ratio,
  })
}

/// Compute return statistics of a portfolio value series.
pub fn analyze(series: &PortfolioValueSeries, periods_per_year: u32) -> Result<ReturnStatistics> {
  statistics(series.view(), periods_per_year)
}

/// Rolling mean with upper and lower bands at `num_std` sample deviations.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BollingerBands {
  pub window: usize,
  pub mean: Vec<Option<f64>>,
  pub upper: Vec<Option<f64>>,
  pub lower: Vec<Option<f64>>,
}

/// Bollinger bands over the value series; the first `window - 1` entries are `None`.
pub fn bollinger_bands(
  series: &PortfolioValueSeries,
  window: usize,
  num_std: f64,
) -> Result<BollingerBands> {
  let values = series.view();
  if window < 2 || window > values.len() {
    return Err(PortfolioError::DegenerateSeries(format!(
      "window {window} is invalid for {} values",
      values.len()
    )));
  }

  let n = values.len();
  let mut mean = vec![None; n];
  let mut upper = vec![None; n];
  let mut lower = vec![None; n];

  for (offset, w) in values.windows(window).into_iter().enumerate() {
    let i = offset + window - 1;
    let m = w.mean().unwrap_or(f64::NAN);
    let sd = w.std(1.0);
    mean[i] = Some(m);
    upper[i] = Some(m + num_std * sd);
    lower[i] = Some(m - num_std * sd);
  }

  Ok(BollingerBands {
    window,
    mean,
    upper,
    lower,
  })
}
