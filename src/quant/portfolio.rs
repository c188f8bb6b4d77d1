//! # Portfolio
//!
//! $$
//! V_t = I \sum_i w_i \frac{P_{t,i}}{P_{0,i}},\qquad
//! \mathbf{w}^\* = \arg\max_{\mathbf{w}\in\Delta^{n-1}} S(\mathbf{w})
//! $$
//!
//! Portfolio valuation, return statistics and Sharpe-ratio allocation.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod optimizers;
pub mod provider;
pub mod returns;
pub mod types;
pub mod valuation;

pub use config::Holding;
pub use config::PortfolioConfig;
pub use data::FillPolicy;
pub use data::align;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use engine::PortfolioReport;
pub use error::ConfigError;
pub use error::PortfolioError;
pub use error::Result;
pub use optimizers::OptimizerConfig;
pub use optimizers::optimize;
pub use optimizers::optimize_sharpe;
pub use provider::GbmProvider;
pub use provider::InMemoryProvider;
pub use provider::PriceSeriesProvider;
pub use returns::ANNUALLY;
pub use returns::BollingerBands;
pub use returns::DAILY;
pub use returns::WEEKLY;
pub use returns::analyze;
pub use returns::bollinger_bands;
pub use returns::daily_returns;
pub use returns::periods_per_year;
pub use types::AlignedPriceTable;
pub use types::Allocation;
pub use types::OptimizationOutcome;
pub use types::PortfolioValueSeries;
pub use types::PriceSeries;
pub use types::ReturnStatistics;
pub use valuation::value;
