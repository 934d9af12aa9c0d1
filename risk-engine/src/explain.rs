//! Human-readable explanations for matched rules

use crate::scoring::{parse_decimal, rule_matches};
use crate::{Rule, RuleCondition, RuleField, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rule that fired for a transaction, with an analyst-facing description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredRule {
    /// Source rule, if the trigger came from a configured rule
    pub rule_id: Option<Uuid>,

    /// Rule name
    pub name: String,

    /// Description
    pub description: String,
}

/// Builds [`TriggeredRule`] descriptions
#[derive(Debug, Clone)]
pub struct RuleExplainer {
    currency_symbol: String,
}

impl RuleExplainer {
    /// Create an explainer printing amounts with the given currency symbol
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Explain every enabled rule that matches the transaction
    pub fn explain(&self, transaction: &Transaction, rules: &[Rule]) -> Vec<TriggeredRule> {
        rules
            .iter()
            .filter(|rule| rule.is_enabled && rule_matches(rule, transaction))
            .map(|rule| TriggeredRule {
                rule_id: Some(rule.id),
                name: rule.name.clone(),
                description: self.describe(rule, transaction),
            })
            .collect()
    }

    /// Describe why a rule fired
    pub fn describe(&self, rule: &Rule, transaction: &Transaction) -> String {
        match &rule.field {
            RuleField::Amount => match (&rule.condition, parse_decimal(&rule.value)) {
                (RuleCondition::GreaterThan, Some(threshold)) => format!(
                    "Transaction amount ({}) exceeded the {} threshold.",
                    self.format_amount(transaction.amount),
                    self.format_amount(threshold)
                ),
                _ => format!("{} rule was triggered.", rule.name),
            },
            RuleField::Device => format!(
                "Transaction was made from a new or suspicious device: {}",
                transaction.device.as_deref().unwrap_or("")
            ),
            RuleField::Location => format!(
                "Transaction originated from a flagged location: {}",
                transaction.location.as_deref().unwrap_or("")
            ),
            RuleField::TransactionType => format!(
                "Transaction type '{}' triggered the rule.",
                transaction.transaction_type
            ),
            RuleField::Unknown(_) => format!("{} rule was triggered.", rule.name),
        }
    }

    /// Format an amount as e.g. `₦1,250,000.00`
    pub fn format_amount(&self, amount: Decimal) -> String {
        let fixed = format!("{:.2}", amount.round_dp(2));
        let (sign, digits) = match fixed.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", fixed.as_str()),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        format!("{}{}{}.{}", sign, self.currency_symbol, grouped, fraction)
    }
}

impl Default for RuleExplainer {
    fn default() -> Self {
        Self::new("₦")
    }
}
