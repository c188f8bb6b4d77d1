//! # Portfolio Configuration
//!
//! JSON portfolio documents of the form
//!
//! ```json
//! {
//!   "investment": 100,
//!   "portfolio": {
//!     "AAPL": { "alloc": 0.5, "buy_date": "2015-04-13", "buy_price": 100 },
//!     "GOOG": { "alloc": 0.5, "buy_date": "2015-04-13" }
//!   }
//! }
//! ```
//!
//! Holdings keep document order, which becomes the instrument column order.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;

use super::error::ConfigError;
use super::types::Allocation;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One instrument position in a portfolio document.
#[derive(Clone, Debug, PartialEq)]
pub struct Holding {
  pub instrument: String,
  /// Initial weight in `(0, 1]`, if given.
  pub allocation: Option<f64>,
  /// First date of price history requested for this instrument.
  pub buy_date: NaiveDate,
  /// Informational only; never used in valuation.
  pub buy_price: Option<f64>,
}

/// Validated portfolio configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioConfig {
  pub investment: f64,
  pub holdings: Vec<Holding>,
}

/// A number, or a string holding one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
  Number(f64),
  Text(String),
  Other(Value),
}

impl Numeric {
  fn value(&self) -> Option<f64> {
    match self {
      Numeric::Number(n) => Some(*n),
      Numeric::Text(s) => s.trim().parse().ok(),
      Numeric::Other(_) => None,
    }
  }
}

impl fmt::Display for Numeric {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Numeric::Number(n) => write!(f, "{n}"),
      Numeric::Text(s) => write!(f, "{s:?}"),
      Numeric::Other(v) => write!(f, "{v}"),
    }
  }
}

#[derive(Debug, Deserialize)]
struct RawHolding {
  #[serde(default)]
  alloc: Option<Numeric>,
  #[serde(default)]
  buy_date: Value,
  #[serde(default)]
  buy_price: Option<Numeric>,
}

/// Document as written; holdings stay untyped so their order and names survive.
#[derive(Debug, Deserialize)]
struct RawDocument {
  #[serde(default)]
  investment: Option<Numeric>,
  #[serde(default)]
  portfolio: Option<Map<String, Value>>,
}

impl RawHolding {
  fn into_holding(self, instrument: &str) -> Result<Holding, ConfigError> {
    let allocation = match self.alloc {
      None => None,
      Some(raw) => Some(
        raw
          .value()
          .filter(|a| a.is_finite() && *a > 0.0 && *a <= 1.0)
          .ok_or_else(|| ConfigError::Allocation(format!("{instrument}: {raw}")))?,
      ),
    };

    let buy_date = self
      .buy_date
      .as_str()
      .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
      .ok_or_else(|| ConfigError::BuyDate {
        instrument: instrument.to_string(),
        value: match &self.buy_date {
          Value::String(s) => s.clone(),
          other => other.to_string(),
        },
      })?;

    let buy_price = match self.buy_price {
      None => None,
      Some(raw) => Some(
        raw
          .value()
          .filter(|p| p.is_finite() && *p > 0.0)
          .ok_or_else(|| ConfigError::BuyPrice {
            instrument: instrument.to_string(),
          })?,
      ),
    };

    Ok(Holding {
      instrument: instrument.to_string(),
      allocation,
      buy_date,
      buy_price,
    })
  }
}

impl RawDocument {
  fn into_config(self) -> Result<PortfolioConfig, ConfigError> {
    let investment = self
      .investment
      .as_ref()
      .and_then(Numeric::value)
      .ok_or_else(|| ConfigError::Investment("investment parameter must be a number".into()))?;

    let portfolio = self
      .portfolio
      .ok_or_else(|| ConfigError::Document("missing \"portfolio\" object".into()))?;

    let holdings = portfolio
      .iter()
      .map(|(instrument, entry)| {
        RawHolding::deserialize(entry)
          .map_err(|e| ConfigError::Document(format!("holding {instrument}: {e}")))?
          .into_holding(instrument)
      })
      .collect::<Result<Vec<_>, _>>()?;

    PortfolioConfig::new(investment, holdings)
  }
}

impl PortfolioConfig {
  /// Validate an already built configuration.
  pub fn new(investment: f64, holdings: Vec<Holding>) -> Result<Self, ConfigError> {
    let config = Self {
      investment,
      holdings,
    };
    config.validate()?;
    Ok(config)
  }

  /// Parse and validate a JSON document.
  pub fn from_json_value(document: &Value) -> Result<Self, ConfigError> {
    RawDocument::deserialize(document)
      .map_err(|e| ConfigError::Document(e.to_string()))?
      .into_config()
  }

  pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
    serde_json::from_str::<RawDocument>(document)
      .map_err(|e| ConfigError::Document(e.to_string()))?
      .into_config()
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if !(self.investment.is_finite() && self.investment > 0.0) {
      return Err(ConfigError::Investment(self.investment.to_string()));
    }
    if self.holdings.is_empty() {
      return Err(ConfigError::Instruments("portfolio has no instruments".into()));
    }

    let mut seen = HashSet::new();
    for holding in &self.holdings {
      if holding.instrument.trim().is_empty() {
        return Err(ConfigError::Instruments("empty instrument identifier".into()));
      }
      if !seen.insert(holding.instrument.as_str()) {
        return Err(ConfigError::Instruments(format!(
          "{} listed more than once",
          holding.instrument
        )));
      }
      if let Some(alloc) = holding.allocation {
        if !(alloc.is_finite() && alloc > 0.0 && alloc <= 1.0) {
          return Err(ConfigError::Allocation(format!("{}: {alloc}", holding.instrument)));
        }
      }
      if let Some(price) = holding.buy_price {
        if !(price.is_finite() && price > 0.0) {
          return Err(ConfigError::BuyPrice {
            instrument: holding.instrument.clone(),
          });
        }
      }
    }

    let given = self.holdings.iter().filter(|h| h.allocation.is_some()).count();
    if given != 0 && given != self.holdings.len() {
      return Err(ConfigError::Allocation(
        "alloc must be given for every holding or for none".into(),
      ));
    }
    if given > 0 {
      self.allocation().transpose()?;
    }

    Ok(())
  }

  /// Instrument identifiers in document order.
  pub fn instruments(&self) -> Vec<String> {
    self.holdings.iter().map(|h| h.instrument.clone()).collect()
  }

  /// Configured initial allocation, when every holding carries one.
  pub fn allocation(&self) -> Option<Result<Allocation, ConfigError>> {
    self
      .holdings
      .iter()
      .map(|h| h.allocation)
      .collect::<Option<Vec<f64>>>()
      .map(Allocation::new)
  }

  /// Earliest buy date across holdings.
  pub fn earliest_buy_date(&self) -> Option<NaiveDate> {
    self.holdings.iter().map(|h| h.buy_date).min()
  }

  /// Render back into the document shape accepted by [`Self::from_json_value`].
  pub fn to_json(&self) -> Value {
    let mut portfolio = Map::new();
    for h in &self.holdings {
      portfolio.insert(
        h.instrument.clone(),
        json!({
          "alloc": h.allocation,
          "buy_date": h.buy_date.format(DATE_FORMAT).to_string(),
          "buy_price": h.buy_price,
        }),
      );
    }
    json!({
      "investment": self.investment,
      "portfolio": portfolio,
    })
  }
}

impl FromStr for PortfolioConfig {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_json_str(s)
  }
}

impl fmt::Display for PortfolioConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.to_json())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"{
    "investment": 100,
    "portfolio": {
      "APPL": {"alloc": 0.5, "buy_date": "2015-04-13", "buy_price": 100},
      "GOOG": {"alloc": 0.5, "buy_date": "2015-04-13"}
    }
  }"#;

  #[test]
  fn parses_sample_document_in_order() {
    let config: PortfolioConfig = SAMPLE.parse().unwrap();

    assert_eq!(config.investment, 100.0);
    assert_eq!(config.instruments(), vec!["APPL".to_string(), "GOOG".to_string()]);
    assert_eq!(config.holdings[0].buy_price, Some(100.0));
    assert_eq!(config.holdings[1].buy_price, None);
    assert_eq!(
      config.holdings[1].buy_date,
      NaiveDate::from_ymd_opt(2015, 4, 13).unwrap()
    );
    assert_eq!(config.allocation().unwrap().unwrap().weights(), &[0.5, 0.5]);
  }

  #[test]
  fn malformed_buy_date_is_config_error() {
    let doc = SAMPLE.replacen("2015-04-13", "2015-13-40", 1);
    let err = PortfolioConfig::from_json_str(&doc).unwrap_err();

    assert_eq!(
      err,
      ConfigError::BuyDate {
        instrument: "APPL".into(),
        value: "2015-13-40".into(),
      }
    );
  }

  #[test]
  fn investment_accepts_numeric_strings_only() {
    let ok = SAMPLE.replace("\"investment\": 100", "\"investment\": \"250.5\"");
    assert_eq!(PortfolioConfig::from_json_str(&ok).unwrap().investment, 250.5);

    let bad = SAMPLE.replace("\"investment\": 100", "\"investment\": \"lots\"");
    assert!(matches!(
      PortfolioConfig::from_json_str(&bad),
      Err(ConfigError::Investment(_))
    ));

    let negative = SAMPLE.replace("\"investment\": 100", "\"investment\": -5");
    assert!(matches!(
      PortfolioConfig::from_json_str(&negative),
      Err(ConfigError::Investment(_))
    ));
  }

  #[test]
  fn allocation_rules_are_enforced() {
    let zero = SAMPLE.replacen("\"alloc\": 0.5", "\"alloc\": 0", 1);
    assert!(matches!(
      PortfolioConfig::from_json_str(&zero),
      Err(ConfigError::Allocation(_))
    ));

    let unbalanced = SAMPLE.replacen("\"alloc\": 0.5", "\"alloc\": 0.7", 1);
    assert!(matches!(
      PortfolioConfig::from_json_str(&unbalanced),
      Err(ConfigError::Allocation(_))
    ));

    let partial = SAMPLE.replacen("\"alloc\": 0.5, ", "", 1);
    assert!(matches!(
      PortfolioConfig::from_json_str(&partial),
      Err(ConfigError::Allocation(_))
    ));

    let none = SAMPLE.replace("\"alloc\": 0.5, ", "");
    assert!(PortfolioConfig::from_json_str(&none).unwrap().allocation().is_none());
  }

  #[test]
  fn buy_price_must_be_positive_number() {
    let doc = SAMPLE.replace("\"buy_price\": 100", "\"buy_price\": \"cheap\"");
    assert_eq!(
      PortfolioConfig::from_json_str(&doc).unwrap_err(),
      ConfigError::BuyPrice {
        instrument: "APPL".into()
      }
    );
  }

  #[test]
  fn holding_fields_accept_numeric_strings() {
    let doc = r#"{
      "investment": "100",
      "portfolio": {
        "APPL": {"alloc": "0.25", "buy_date": "2015-04-13", "buy_price": " 99.5 "},
        "GOOG": {"alloc": 0.75, "buy_date": "2015-04-13"}
      }
    }"#;
    let config = PortfolioConfig::from_json_str(doc).unwrap();

    assert_eq!(config.investment, 100.0);
    assert_eq!(config.holdings[0].allocation, Some(0.25));
    assert_eq!(config.holdings[0].buy_price, Some(99.5));
    assert_eq!(config.allocation().unwrap().unwrap().weights(), &[0.25, 0.75]);
  }

  #[test]
  fn wrongly_typed_fields_map_to_their_error_kind() {
    let flag = SAMPLE.replacen("\"alloc\": 0.5", "\"alloc\": true", 1);
    assert_eq!(
      PortfolioConfig::from_json_str(&flag).unwrap_err(),
      ConfigError::Allocation("APPL: true".into())
    );

    let numeric_date = SAMPLE.replacen("\"2015-04-13\"", "20150413", 1);
    assert_eq!(
      PortfolioConfig::from_json_str(&numeric_date).unwrap_err(),
      ConfigError::BuyDate {
        instrument: "APPL".into(),
        value: "20150413".into(),
      }
    );

    let scalar = r#"{"investment": 1, "portfolio": {"AAA": 5}}"#;
    assert!(matches!(
      PortfolioConfig::from_json_str(scalar),
      Err(ConfigError::Document(_))
    ));

    let missing = r#"{"investment": 1}"#;
    assert!(matches!(
      PortfolioConfig::from_json_str(missing),
      Err(ConfigError::Document(_))
    ));
  }

  #[test]
  fn empty_portfolio_is_rejected() {
    let err = PortfolioConfig::from_json_str(r#"{"investment": 1, "portfolio": {}}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Instruments(_)));
    assert!(matches!(
      PortfolioConfig::from_json_str("not json"),
      Err(ConfigError::Document(_))
    ));
  }

  #[test]
  fn renders_back_to_the_same_document() {
    let config: PortfolioConfig = SAMPLE.parse().unwrap();
    let again = PortfolioConfig::from_json_value(&config.to_json()).unwrap();

    assert_eq!(config, again);
    assert!(config.to_string().starts_with("{\"investment\":100.0"));
  }
}
