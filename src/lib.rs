//! # sharpe-rs
//!
//! $$
//! \mathbf{w}^\* = \arg\max_{\mathbf{w}\in\Delta^{n-1}} \sqrt{P}\,\bar r(\mathbf{w})/\hat\sigma_r(\mathbf{w})
//! $$
//!
//! Portfolio analytics for a weighted basket of instruments: alignment of daily
//! price series, normalized portfolio value curves, return statistics and the
//! long-only allocation that maximizes the Sharpe ratio.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use sharpe_rs::quant::portfolio::GbmProvider;
//! use sharpe_rs::quant::portfolio::PortfolioConfig;
//! use sharpe_rs::quant::portfolio::PortfolioEngine;
//!
//! let portfolio: PortfolioConfig = r#"{
//!   "investment": 100,
//!   "portfolio": {
//!     "AAA": {"buy_date": "2023-01-02"},
//!     "BBB": {"buy_date": "2023-01-02"}
//!   }
//! }"#
//! .parse()
//! .unwrap();
//!
//! let provider = GbmProvider::new(0.07, 0.2, 100.0, 1);
//! let end = NaiveDate::from_ymd_opt(2023, 12, 29).unwrap();
//! let report = PortfolioEngine::default().run(&provider, &portfolio, end).unwrap();
//! println!("{:?}", report.allocation_map());
//! ```

pub mod quant;
