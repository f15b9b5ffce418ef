// src/trading/strategy_builder.rs
// Turns detected patterns and computed indicators into a declarative strategy.

use crate::indicators::{embedded_period, IndicatorOutput};
use crate::patterns::{Bias, PatternMatch};
use crate::trading::strategy::{
    ParamValue, Parameters, RiskManagement, Rule, RuleAction, RuleCondition, Strategy,
};
use indexmap::IndexMap;
use log::debug;

pub const DEFAULT_STRATEGY_NAME: &str = "Auto-generated Strategy";
const DEFAULT_DESCRIPTION: &str = "Strategy based on technical indicators and chart patterns";

const DEFAULT_MA_PERIOD: i64 = 20;
const DEFAULT_RSI_PERIOD: i64 = 14;
const RSI_OVERBOUGHT: i64 = 70;
const RSI_OVERSOLD: i64 = 30;
const PRICE_ACTION_LOOKBACK: usize = 3;

/// Builds a strategy from patterns and indicators. The result always has at
/// least one entry rule, one exit rule and a full risk-management block.
pub fn create_strategy(
    patterns: &[PatternMatch],
    indicators: &IndexMap<String, IndicatorOutput>,
) -> Strategy {
    let mut builder = StrategyBuilder::new();
    if let Some(top) = top_pattern(patterns) {
        builder.add_pattern(top);
    }
    for name in indicators.keys() {
        builder.add_indicator(name);
    }
    builder.finish()
}

fn top_pattern(patterns: &[PatternMatch]) -> Option<&PatternMatch> {
    let mut best: Option<&PatternMatch> = None;
    for pattern in patterns {
        if best.map_or(true, |b| pattern.probability > b.probability) {
            best = Some(pattern);
        }
    }
    best
}

struct StrategyBuilder {
    description: String,
    entry_rules: Vec<Rule>,
    exit_rules: Vec<Rule>,
    risk_management: RiskManagement,
    parameters: Parameters,
}

impl StrategyBuilder {
    fn new() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            entry_rules: Vec::new(),
            exit_rules: Vec::new(),
            risk_management: RiskManagement::default(),
            parameters: Parameters::new(),
        }
    }

    fn add_pattern(&mut self, top: &PatternMatch) {
        let kind = top.pattern;
        self.description
            .push_str(&format!(" with {} pattern", kind.title()));

        let (action, side) = match kind.bias() {
            Bias::Bullish => (RuleAction::Buy, "long"),
            Bias::Bearish => (RuleAction::Sell, "short"),
            Bias::Neutral => return,
        };
        self.entry_rules.push(Rule::Pattern {
            pattern: kind,
            action,
            description: format!("Enter {} when {} pattern is confirmed", side, kind.words()),
        });
    }

    fn add_indicator(&mut self, name: &str) {
        if name.starts_with("SMA") || name.starts_with("EMA") {
            self.add_moving_average(name);
        } else if name.starts_with("RSI") {
            self.add_rsi(name);
        } else if name.starts_with("MACD") {
            self.add_macd();
        } else {
            debug!("Strategy builder: no rules for indicator {}", name);
        }
    }

    fn indicator_rule(
        &mut self,
        entry: bool,
        indicator: &str,
        action: RuleAction,
        condition: RuleCondition,
        threshold: Option<i64>,
        description: String,
    ) {
        let rule = Rule::Indicator {
            indicator: indicator.to_string(),
            action,
            condition,
            threshold: threshold.map(|t| t as f64),
            description,
        };
        if entry {
            self.entry_rules.push(rule);
        } else {
            self.exit_rules.push(rule);
        }
    }

    fn add_moving_average(&mut self, name: &str) {
        use RuleAction::*;
        use RuleCondition::*;

        let period = embedded_period(name).map(|p| p as i64).unwrap_or(DEFAULT_MA_PERIOD);

        self.indicator_rule(
            true,
            name,
            Buy,
            PriceCrossesAbove,
            None,
            format!("Enter long when price crosses above {}", name),
        );
        self.indicator_rule(
            true,
            name,
            Sell,
            PriceCrossesBelow,
            None,
            format!("Enter short when price crosses below {}", name),
        );
        self.indicator_rule(
            false,
            name,
            ExitLong,
            PriceCrossesBelow,
            None,
            format!("Exit long when price crosses below {}", name),
        );
        self.indicator_rule(
            false,
            name,
            ExitShort,
            PriceCrossesAbove,
            None,
            format!("Exit short when price crosses above {}", name),
        );

        self.parameters.insert(format!("{}_period", name), ParamValue::Int(period));
    }

    fn add_rsi(&mut self, name: &str) {
        use RuleAction::*;
        use RuleCondition::*;

        let period = embedded_period(name).map(|p| p as i64).unwrap_or(DEFAULT_RSI_PERIOD);

        self.indicator_rule(
            true,
            name,
            Buy,
            CrossesAbove,
            Some(RSI_OVERSOLD),
            format!("Enter long when {} crosses above {} (oversold)", name, RSI_OVERSOLD),
        );
        self.indicator_rule(
            true,
            name,
            Sell,
            CrossesBelow,
            Some(RSI_OVERBOUGHT),
            format!("Enter short when {} crosses below {} (overbought)", name, RSI_OVERBOUGHT),
        );
        self.indicator_rule(
            false,
            name,
            ExitLong,
            CrossesAbove,
            Some(RSI_OVERBOUGHT),
            format!("Exit long when {} crosses above {} (overbought)", name, RSI_OVERBOUGHT),
        );
        self.indicator_rule(
            false,
            name,
            ExitShort,
            CrossesBelow,
            Some(RSI_OVERSOLD),
            format!("Exit short when {} crosses below {} (oversold)", name, RSI_OVERSOLD),
        );

        self.parameters.insert(format!("{}_period", name), ParamValue::Int(period));
        self.parameters.insert(format!("{}_overbought", name), ParamValue::Int(RSI_OVERBOUGHT));
        self.parameters.insert(format!("{}_oversold", name), ParamValue::Int(RSI_OVERSOLD));
    }

    fn add_macd(&mut self) {
        use RuleAction::*;
        use RuleCondition::*;

        self.indicator_rule(
            true,
            "MACD",
            Buy,
            LineCrossesAboveSignal,
            None,
            "Enter long when MACD line crosses above signal line".to_string(),
        );
        self.indicator_rule(
            true,
            "MACD",
            Sell,
            LineCrossesBelowSignal,
            None,
            "Enter short when MACD line crosses below signal line".to_string(),
        );
        self.indicator_rule(
            false,
            "MACD",
            ExitLong,
            LineCrossesBelowSignal,
            None,
            "Exit long when MACD line crosses below signal line".to_string(),
        );
        self.indicator_rule(
            false,
            "MACD",
            ExitShort,
            LineCrossesAboveSignal,
            None,
            "Exit short when MACD line crosses above signal line".to_string(),
        );

        self.parameters.insert("MACD_fast_period".to_string(), ParamValue::Int(12));
        self.parameters.insert("MACD_slow_period".to_string(), ParamValue::Int(26));
        self.parameters.insert("MACD_signal_period".to_string(), ParamValue::Int(9));
    }

    fn finish(mut self) -> Strategy {
        if self.entry_rules.is_empty() {
            self.entry_rules.push(Rule::PriceAction {
                action: RuleAction::Buy,
                condition: RuleCondition::HigherHighHigherLow,
                lookback: PRICE_ACTION_LOOKBACK,
                description: format!(
                    "Enter long when price makes {} consecutive higher highs and higher lows",
                    PRICE_ACTION_LOOKBACK
                ),
            });
            self.entry_rules.push(Rule::PriceAction {
                action: RuleAction::Sell,
                condition: RuleCondition::LowerHighLowerLow,
                lookback: PRICE_ACTION_LOOKBACK,
                description: format!(
                    "Enter short when price makes {} consecutive lower highs and lower lows",
                    PRICE_ACTION_LOOKBACK
                ),
            });
        }

        if self.exit_rules.is_empty() {
            let sl = self.risk_management.stop_loss_percent;
            let tp = self.risk_management.take_profit_percent;
            self.exit_rules.extend([
                Rule::StopLoss {
                    action: RuleAction::ExitLong,
                    percent: sl,
                    description: format!("Exit long when price falls {}% below entry", sl),
                },
                Rule::StopLoss {
                    action: RuleAction::ExitShort,
                    percent: sl,
                    description: format!("Exit short when price rises {}% above entry", sl),
                },
                Rule::TakeProfit {
                    action: RuleAction::ExitLong,
                    percent: tp,
                    description: format!("Exit long when price rises {}% above entry", tp),
                },
                Rule::TakeProfit {
                    action: RuleAction::ExitShort,
                    percent: tp,
                    description: format!("Exit short when price falls {}% below entry", tp),
                },
            ]);
        }

        debug!(
            "Built strategy: {} entry rules, {} exit rules, {} parameters",
            self.entry_rules.len(),
            self.exit_rules.len(),
            self.parameters.len()
        );

        Strategy {
            name: DEFAULT_STRATEGY_NAME.to_string(),
            description: self.description,
            entry_rules: self.entry_rules,
            exit_rules: self.exit_rules,
            risk_management: self.risk_management,
            parameters: self.parameters,
        }
    }
}
