//! # Portfolio Engine
//!
//! $$
//! \text{provider}\to\text{align}\to\mathbf{w}^\*\to V_t\to(R, \bar r, \hat\sigma_r, S)
//! $$
//!
//! High-level orchestration of data fetch, alignment, optimization, valuation and statistics.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use super::config::PortfolioConfig;
use super::data::FillPolicy;
use super::data::align;
use super::error::PortfolioError;
use super::error::Result;
use super::optimizers::OptimizerConfig;
use super::optimizers::optimize_sharpe;
use super::provider::PriceSeriesProvider;
use super::returns::BollingerBands;
use super::returns::DAILY;
use super::returns::analyze;
use super::returns::bollinger_bands;
use super::types::AlignedPriceTable;
use super::types::Allocation;
use super::types::OptimizationOutcome;
use super::types::PortfolioValueSeries;
use super::types::ReturnStatistics;
use super::valuation::value;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug)]
pub struct PortfolioEngineConfig {
  /// Sampling periods per year used for the Sharpe ratio.
  pub periods_per_year: u32,
  /// Gap policy used when aligning provider output.
  pub fill_policy: FillPolicy,
  /// Value the portfolio from this date on; the optimizer always uses the full range.
  pub start_date: Option<NaiveDate>,
  /// Optimize weights even when the configuration carries an allocation.
  pub optimize: bool,
  /// Solver limits.
  pub optimizer: OptimizerConfig,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      periods_per_year: DAILY,
      fill_policy: FillPolicy::Fill,
      start_date: None,
      optimize: false,
      optimizer: OptimizerConfig::default(),
    }
  }
}

/// Result of one analysis run.
#[derive(Clone, Debug, Serialize)]
pub struct PortfolioReport {
  pub instruments: Vec<String>,
  pub allocation: Allocation,
  pub statistics: ReturnStatistics,
  pub value_series: PortfolioValueSeries,
  /// Whether `allocation` came from the optimizer.
  pub optimized: bool,
}

impl PortfolioReport {
  /// `(instrument, weight)` pairs in column order.
  pub fn allocation_map(&self) -> Vec<(String, f64)> {
    self
      .instruments
      .iter()
      .cloned()
      .zip(self.allocation.weights().iter().copied())
      .collect()
  }
}

/// Single entry-point engine for portfolio analytics workflows.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  /// Fetch every holding from its buy date to `end` and align the results.
  pub fn load_table<P: PriceSeriesProvider>(
    &self,
    provider: &P,
    portfolio: &PortfolioConfig,
    end: NaiveDate,
  ) -> Result<AlignedPriceTable> {
    let series = portfolio
      .holdings
      .iter()
      .map(|holding| {
        provider
          .fetch(&holding.instrument, holding.buy_date, end)
          .map_err(|e| PortfolioError::Provider {
            instrument: holding.instrument.clone(),
            message: format!("{e:#}"),
          })
      })
      .collect::<Result<Vec<_>>>()?;

    align(&series, self.config.fill_policy)
  }

  /// Maximize the Sharpe ratio over the full table.
  pub fn optimize(
    &self,
    table: &AlignedPriceTable,
    investment: f64,
  ) -> Result<OptimizationOutcome> {
    optimize_sharpe(
      table,
      investment,
      self.config.periods_per_year,
      &self.config.optimizer,
    )
  }

  /// Value and analyze a given allocation.
  pub fn evaluate(
    &self,
    table: &AlignedPriceTable,
    allocation: &Allocation,
    investment: f64,
  ) -> Result<(PortfolioValueSeries, ReturnStatistics)> {
    let series = value(table, allocation, investment, self.config.start_date)?;
    let statistics = analyze(&series, self.config.periods_per_year)?;
    Ok((series, statistics))
  }

  /// Analyze an aligned table with the configured or optimized allocation.
  pub fn analyze_table(
    &self,
    table: &AlignedPriceTable,
    portfolio: &PortfolioConfig,
  ) -> Result<PortfolioReport> {
    let configured = portfolio.allocation().transpose()?;
    let (allocation, optimized) = match configured {
      Some(allocation) if !self.config.optimize => (allocation, false),
      _ => (self.optimize(table, portfolio.investment)?.allocation, true),
    };

    let (value_series, statistics) = self.evaluate(table, &allocation, portfolio.investment)?;
    info!(
      instruments = table.n_instruments(),
      rows = value_series.len(),
      optimized,
      sharpe = statistics.sharpe_ratio,
      "portfolio analyzed"
    );

    Ok(PortfolioReport {
      instruments: table.instruments().to_vec(),
      allocation,
      statistics,
      value_series,
      optimized,
    })
  }

  /// End-to-end run: fetch, align, allocate, value and analyze.
  pub fn run<P: PriceSeriesProvider>(
    &self,
    provider: &P,
    portfolio: &PortfolioConfig,
    end: NaiveDate,
  ) -> Result<PortfolioReport> {
    if let Some(first) = portfolio.earliest_buy_date() {
      if first > end {
        warn!(%first, %end, "every buy date lies after the analysis end");
      }
    }
    let table = self.load_table(provider, portfolio, end)?;
    self.analyze_table(&table, portfolio)
  }

  /// Bollinger bands of a report's value series.
  pub fn bands(
    &self,
    report: &PortfolioReport,
    window: usize,
    num_std: f64,
  ) -> Result<BollingerBands> {
    bollinger_bands(&report.value_series, window, num_std)
  }
}
