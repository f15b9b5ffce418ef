// src/trading/strategy.rs
use crate::errors::{CoreError, Result};
use crate::patterns::PatternKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Buy,
    Sell,
    ExitLong,
    ExitShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    PriceCrossesAbove,
    PriceCrossesBelow,
    CrossesAbove,
    CrossesBelow,
    LineCrossesAboveSignal,
    LineCrossesBelowSignal,
    HigherHighHigherLow,
    LowerHighLowerLow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    Pattern {
        pattern: PatternKind,
        action: RuleAction,
        description: String,
    },
    Indicator {
        indicator: String,
        action: RuleAction,
        condition: RuleCondition,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<f64>,
        description: String,
    },
    PriceAction {
        action: RuleAction,
        condition: RuleCondition,
        lookback: usize,
        description: String,
    },
    StopLoss {
        action: RuleAction,
        percent: f64,
        description: String,
    },
    TakeProfit {
        action: RuleAction,
        percent: f64,
        description: String,
    },
}

impl Rule {
    pub fn action(&self) -> RuleAction {
        match self {
            Rule::Pattern { action, .. }
            | Rule::Indicator { action, .. }
            | Rule::PriceAction { action, .. }
            | Rule::StopLoss { action, .. }
            | Rule::TakeProfit { action, .. } => *action,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Rule::Pattern { description, .. }
            | Rule::Indicator { description, .. }
            | Rule::PriceAction { description, .. }
            | Rule::StopLoss { description, .. }
            | Rule::TakeProfit { description, .. } => description,
        }
    }

    /// Indicator name for indicator rules.
    pub fn indicator(&self) -> Option<&str> {
        match self {
            Rule::Indicator { indicator, .. } => Some(indicator),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskManagement {
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
    #[serde(default = "default_max_position_size")]
    pub max_position_size_percent: f64,
}

fn default_max_position_size() -> f64 {
    5.0
}

impl Default for RiskManagement {
    fn default() -> Self {
        Self {
            stop_loss_percent: 2.0,
            take_profit_percent: 6.0,
            max_position_size_percent: default_max_position_size(),
        }
    }
}

/// A tunable strategy parameter. Integers and floats are kept apart so that
/// periods round-trip as integers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            ParamValue::Int(v) => *v as f64,
            ParamValue::Float(v) => *v,
        }
    }

    /// Positive whole numbers only.
    pub fn as_period(&self) -> Option<usize> {
        match *self {
            ParamValue::Int(v) if v > 0 => usize::try_from(v).ok(),
            ParamValue::Float(v) if v > 0.0 && v.is_finite() && v.fract() == 0.0 => {
                Some(v as usize)
            }
            _ => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl FromStr for ParamValue {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(v) = s.parse::<i64>() {
            return Ok(ParamValue::Int(v));
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(ParamValue::Float(v)),
            _ => Err(CoreError::Validation(format!("Invalid parameter value '{}'", s))),
        }
    }
}

pub type Parameters = IndexMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub entry_rules: Vec<Rule>,
    pub exit_rules: Vec<Rule>,
    pub risk_management: RiskManagement,
    #[serde(default)]
    pub parameters: Parameters,
}

impl Strategy {
    /// Reads a strategy document and checks it with [`Strategy::validate`].
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let strategy: Strategy = serde_json::from_reader(reader)
            .map_err(|e| CoreError::Validation(format!("Invalid strategy document: {}", e)))?;
        strategy.validate()?;
        Ok(strategy)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Missing required field 'name'".to_string()));
        }
        if self.entry_rules.is_empty() {
            return Err(CoreError::Validation("Entry rules cannot be empty".to_string()));
        }
        if self.exit_rules.is_empty() {
            return Err(CoreError::Validation("Exit rules cannot be empty".to_string()));
        }

        let risk = &self.risk_management;
        for (field, value) in [
            ("stop_loss_percent", risk.stop_loss_percent),
            ("take_profit_percent", risk.take_profit_percent),
            ("max_position_size_percent", risk.max_position_size_percent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::Validation(format!("Invalid {} value", field)));
            }
        }
        if risk.stop_loss_percent >= 100.0 {
            return Err(CoreError::Validation(
                "Invalid stop_loss_percent value: must be below 100".to_string(),
            ));
        }
        Ok(())
    }

    /// The first `SMA_*_period` / `EMA_*_period` parameter, in parameter order.
    /// `Ok(None)` when the strategy has no moving-average parameter.
    pub fn moving_average_period(&self) -> Result<Option<(&str, usize)>> {
        let Some((name, value)) = self
            .parameters
            .iter()
            .find(|(name, _)| is_moving_average_param(name))
        else {
            return Ok(None);
        };

        match value.as_period() {
            Some(period) => Ok(Some((name.as_str(), period))),
            None => Err(CoreError::Validation(format!(
                "Invalid {} value: {} is not a positive whole number",
                name, value
            ))),
        }
    }

    /// Copy with `overrides` laid over the parameters; existing keys keep their
    /// position, new keys are appended.
    pub fn with_parameters(&self, overrides: &Parameters) -> Strategy {
        let mut copy = self.clone();
        for (name, value) in overrides {
            copy.parameters.insert(name.clone(), *value);
        }
        copy
    }
}

pub fn is_moving_average_param(name: &str) -> bool {
    (name.starts_with("SMA_") || name.starts_with("EMA_")) && name.ends_with("_period")
}
