//! # Portfolio Valuation
//!
//! $$
//! V_t = I \sum_i w_i \frac{P_{t,i}}{P_{0,i}}
//! $$
//!
//! Normalized, weighted portfolio value curve from an aligned price table.

use chrono::NaiveDate;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray::s;

use super::error::ConfigError;
use super::error::PortfolioError;
use super::error::Result;
use super::types::AlignedPriceTable;
use super::types::Allocation;
use super::types::PortfolioValueSeries;

pub(crate) fn check_investment(investment: f64) -> Result<()> {
  if investment.is_finite() && investment > 0.0 {
    Ok(())
  } else {
    Err(ConfigError::Investment(investment.to_string()).into())
  }
}

/// Divide every column by its first row so each instrument starts at 1.0.
pub fn normalize(prices: ArrayView2<'_, f64>) -> Array2<f64> {
  let first = prices.row(0).to_owned();
  &prices / &first
}

/// Weighted sum of normalized columns scaled by `investment`.
///
/// Weights are not required to lie on the simplex here; callers that need
/// that guarantee go through [`value`].
pub fn combine(
  normalized: ArrayView2<'_, f64>,
  weights: ArrayView1<'_, f64>,
  investment: f64,
) -> Array1<f64> {
  normalized.dot(&weights) * investment
}

/// Value a portfolio over the table, optionally starting at `start_date`.
pub fn value(
  table: &AlignedPriceTable,
  allocation: &Allocation,
  investment: f64,
  start_date: Option<NaiveDate>,
) -> Result<PortfolioValueSeries> {
  check_investment(investment)?;
  if allocation.len() != table.n_instruments() {
    return Err(
      ConfigError::Allocation(format!(
        "{} weights for {} instruments",
        allocation.len(),
        table.n_instruments()
      ))
      .into(),
    );
  }

  let first_row = match start_date {
    Some(start) => table
      .dates()
      .iter()
      .position(|date| *date >= start)
      .ok_or(PortfolioError::EmptyRange {
        start,
        first: table.dates().first().copied(),
        last: table.dates().last().copied(),
      })?,
    None => 0,
  };

  let prices = table.prices().slice(s![first_row.., ..]);
  debug_assert!(prices.len_of(Axis(0)) > 0);
  let values = combine(normalize(prices).view(), allocation.view(), investment);

  PortfolioValueSeries::new(table.dates()[first_row..].to_vec(), values.to_vec())
}
