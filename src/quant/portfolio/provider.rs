//! # Price Series Providers
//!
//! $$
//! S_{t+\Delta} = S_t \exp\!\big((\mu-\tfrac12\sigma^2)\Delta + \sigma\sqrt{\Delta}\,Z\big)
//! $$
//!
//! Market data enters the core only through [`PriceSeriesProvider`].

use std::collections::HashMap;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use chrono::Datelike;
use chrono::Days;
use chrono::NaiveDate;
use chrono::Weekday;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Normal;

use super::types::PriceSeries;

/// Source of daily closing prices.
pub trait PriceSeriesProvider {
  /// Closing prices of `instrument` for every available date in `[start, end]`.
  fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;
}

/// Provider backed by fixed observations, filtered by the requested range.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProvider {
  series: HashMap<String, Vec<(NaiveDate, f64)>>,
}

impl InMemoryProvider {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_series(
    mut self,
    instrument: impl Into<String>,
    points: Vec<(NaiveDate, f64)>,
  ) -> Self {
    self.series.insert(instrument.into(), points);
    self
  }
}

impl PriceSeriesProvider for InMemoryProvider {
  fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
    let points = self
      .series
      .get(instrument)
      .ok_or_else(|| anyhow!("unknown instrument {instrument}"))?
      .iter()
      .copied()
      .filter(|(date, _)| *date >= start && *date <= end)
      .collect();

    Ok(PriceSeries::new(instrument, points)?)
  }
}

/// Synthetic geometric Brownian motion prices on weekdays.
///
/// Paths are deterministic per `(seed, instrument, start)`.
#[derive(Clone, Debug)]
pub struct GbmProvider {
  /// Annualized drift.
  pub mu: f64,
  /// Annualized volatility.
  pub sigma: f64,
  /// Price on the first generated date.
  pub s0: f64,
  pub seed: u64,
  overrides: HashMap<String, (f64, f64)>,
}

impl GbmProvider {
  pub fn new(mu: f64, sigma: f64, s0: f64, seed: u64) -> Self {
    Self {
      mu,
      sigma,
      s0,
      seed,
      overrides: HashMap::new(),
    }
  }

  /// Use a specific drift and volatility for one instrument.
  pub fn with_params(mut self, instrument: impl Into<String>, mu: f64, sigma: f64) -> Self {
    self.overrides.insert(instrument.into(), (mu, sigma));
    self
  }

  fn rng_for(&self, instrument: &str, start: NaiveDate) -> StdRng {
    StdRng::seed_from_u64(path_seed(self.seed, instrument, start))
  }
}

/// FNV-1a over `(seed, instrument, start)` followed by a splitmix64 finalizer.
fn path_seed(seed: u64, instrument: &str, start: NaiveDate) -> u64 {
  const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
  const FNV_PRIME: u64 = 0x0100_0000_01b3;

  let bytes = seed
    .to_le_bytes()
    .into_iter()
    .chain(instrument.bytes())
    .chain([0xff])
    .chain(start.num_days_from_ce().to_le_bytes());
  let mut z = bytes.fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));

  z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
  z ^ (z >> 31)
}

impl PriceSeriesProvider for GbmProvider {
  fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
    let (mu, sigma) = self
      .overrides
      .get(instrument)
      .copied()
      .unwrap_or((self.mu, self.sigma));
    let dt = 1.0 / 252.0;
    let normal = Normal::new((mu - 0.5 * sigma * sigma) * dt, sigma * dt.sqrt())
      .with_context(|| format!("invalid GBM parameters for {instrument}"))?;
    let mut rng = self.rng_for(instrument, start);

    let mut points = Vec::new();
    let mut price = self.s0;
    let mut date = start;
    while date <= end {
      if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        if !points.is_empty() {
          price *= normal.sample(&mut rng).exp();
        }
        points.push((date, price));
      }
      date = date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| anyhow!("date overflow after {date}"))?;
    }

    Ok(PriceSeries::new(instrument, points)?)
  }
}
