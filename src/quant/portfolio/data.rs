//! # Portfolio Data Utilities
//!
//! $$
//! P_{t,i} = \text{close}_i(t),\quad t \in \bigcup_i \mathcal{T}_i
//! $$
//!
//! Alignment of per-instrument price series into one synchronized table.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;

use chrono::NaiveDate;
use ndarray::Array2;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::error::PortfolioError;
use super::error::Result;
use super::types::AlignedPriceTable;
use super::types::PriceSeries;

/// How gaps in the union date index are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
  /// Forward-fill then backward-fill each column; keeps every date.
  #[default]
  Fill,
  /// Remove every date on which any instrument is missing.
  Drop,
}

fn forward_fill(column: &mut [Option<f64>]) {
  let mut last = None;
  for slot in column.iter_mut() {
    match slot {
      Some(v) => last = Some(*v),
      None => *slot = last,
    }
  }
}

fn backward_fill(column: &mut [Option<f64>]) {
  let mut next = None;
  for slot in column.iter_mut().rev() {
    match slot {
      Some(v) => next = Some(*v),
      None => *slot = next,
    }
  }
}

/// Align price series on the union of their dates.
///
/// Columns follow the input order and rows are ascending by date.
pub fn align(series: &[PriceSeries], policy: FillPolicy) -> Result<AlignedPriceTable> {
  if series.is_empty() {
    return Err(PortfolioError::alignment(None, "no price series supplied"));
  }

  let mut seen = HashSet::new();
  for s in series {
    if !seen.insert(s.instrument()) {
      return Err(PortfolioError::alignment(
        Some(s.instrument()),
        "instrument supplied more than once",
      ));
    }
    if s.is_empty() {
      return Err(PortfolioError::alignment(
        Some(s.instrument()),
        "no observations in range",
      ));
    }
  }

  let index: Vec<NaiveDate> = series
    .iter()
    .flat_map(|s| s.points().iter().map(|(date, _)| *date))
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect();

  let mut columns: Vec<Vec<Option<f64>>> = series
    .iter()
    .map(|s| {
      let by_date: BTreeMap<NaiveDate, f64> = s.points().iter().copied().collect();
      index.iter().map(|date| by_date.get(date).copied()).collect()
    })
    .collect();

  let keep: Vec<usize> = match policy {
    FillPolicy::Fill => {
      for column in columns.iter_mut() {
        forward_fill(column);
        backward_fill(column);
      }
      (0..index.len()).collect()
    }
    FillPolicy::Drop => (0..index.len())
      .filter(|&row| columns.iter().all(|c| c[row].is_some()))
      .collect(),
  };

  debug!(
    instruments = series.len(),
    union_rows = index.len(),
    kept_rows = keep.len(),
    ?policy,
    "aligned price series"
  );

  if keep.is_empty() {
    return Err(PortfolioError::alignment(
      None,
      format!("no rows left after cleaning with {policy:?} policy"),
    ));
  }

  let dates: Vec<NaiveDate> = keep.iter().map(|&row| index[row]).collect();
  let mut prices = Array2::<f64>::zeros((keep.len(), series.len()));
  for (j, column) in columns.iter().enumerate() {
    for (i, &row) in keep.iter().enumerate() {
      prices[[i, j]] = column[row].ok_or_else(|| {
        PortfolioError::alignment(Some(series[j].instrument()), "missing value after cleaning")
      })?;
    }
  }

  AlignedPriceTable::new(
    series.iter().map(|s| s.instrument().to_string()).collect(),
    dates,
    prices,
  )
}
