use std::fs;

use anyhow::Context;
use anyhow::Result;
use chrono::Local;
use chrono::NaiveDate;
use sharpe_rs::quant::portfolio::GbmProvider;
use sharpe_rs::quant::portfolio::PortfolioConfig;
use sharpe_rs::quant::portfolio::PortfolioEngine;
use sharpe_rs::quant::portfolio::PortfolioEngineConfig;
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"{
  "investment": 100,
  "portfolio": {
    "AMZN": {"alloc": 0.7, "buy_date": "2016-10-13"},
    "AAPL": {"alloc": 0.3, "buy_date": "2015-10-05", "buy_price": 110}
  }
}"#;

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  // usage: sharpe-rs [config.json] [--optimize] [--end YYYY-MM-DD]
  let mut path = None;
  let mut optimize = false;
  let mut end = Local::now().date_naive();
  let mut args = std::env::args().skip(1);
  while let Some(arg) = args.next() {
    match arg.as_str() {
      "--optimize" => optimize = true,
      "--end" => {
        let raw = args.next().context("--end needs a date")?;
        end = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
          .with_context(|| format!("invalid end date {raw}"))?;
      }
      other => path = Some(other.to_string()),
    }
  }

  let document = match &path {
    Some(p) => fs::read_to_string(p).with_context(|| format!("reading {p}"))?,
    None => SAMPLE.to_string(),
  };
  let portfolio: PortfolioConfig = document.parse()?;

  let engine = PortfolioEngine::new(PortfolioEngineConfig {
    optimize,
    ..Default::default()
  });
  let provider = GbmProvider::new(0.08, 0.25, 100.0, 2015);
  let report = engine.run(&provider, &portfolio, end)?;

  println!("Portfolio: {portfolio}");
  for (instrument, weight) in report.allocation_map() {
    println!("  {instrument}: {weight:.4}");
  }
  for (name, value) in report.statistics.named() {
    println!("{name}: {value:.6}");
  }
  println!("{}", serde_json::to_string_pretty(&report.statistics)?);

  Ok(())
}
