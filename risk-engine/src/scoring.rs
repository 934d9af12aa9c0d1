//! Risk scoring engine

use crate::{RiskAssessment, RiskScore, Rule, RuleCondition, RuleField, Transaction};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;

/// Points added for each matching enabled rule
pub const RULE_MATCH_INCREMENT: u32 = 50;

/// Score a transaction against a rule set.
///
/// Disabled rules are skipped. Every remaining rule that matches adds
/// [`RULE_MATCH_INCREMENT`] and the total is capped at 100. Rule order has no
/// effect on the result.
pub fn compute_risk_score<'a, I>(transaction: &Transaction, rules: I) -> RiskScore
where
    I: IntoIterator<Item = &'a Rule>,
{
    let matches = rules
        .into_iter()
        .filter(|rule| rule.is_enabled && rule_matches(rule, transaction))
        .count() as u32;

    RiskScore::from_points(matches.saturating_mul(RULE_MATCH_INCREMENT))
}

/// Whether a single rule matches, ignoring its enabled flag.
///
/// Malformed operands and unknown fields or conditions never match.
pub fn rule_matches(rule: &Rule, transaction: &Transaction) -> bool {
    let Some(field) = FieldValue::resolve(&rule.field, transaction) else {
        return false;
    };

    match &rule.condition {
        RuleCondition::GreaterThan => match (field.as_decimal(), parse_decimal(&rule.value)) {
            (Some(actual), Some(threshold)) => actual > threshold,
            _ => false,
        },
        RuleCondition::Equals => eq_ignore_case(&field.as_text(), &rule.value),
        RuleCondition::In => list_contains(&rule.value, &field.as_text()),
        RuleCondition::NotIn => !list_contains(&rule.value, &field.as_text()),
        RuleCondition::Unknown(_) => false,
    }
}

/// Value of the inspected transaction field
enum FieldValue<'a> {
    Amount(Decimal),
    Text(&'a str),
}

impl<'a> FieldValue<'a> {
    fn resolve(field: &RuleField, transaction: &'a Transaction) -> Option<Self> {
        match field {
            RuleField::Amount => Some(FieldValue::Amount(transaction.amount)),
            RuleField::Device => Some(FieldValue::Text(transaction.device.as_deref().unwrap_or(""))),
            RuleField::Location => Some(FieldValue::Text(transaction.location.as_deref().unwrap_or(""))),
            RuleField::TransactionType => Some(FieldValue::Text(&transaction.transaction_type)),
            RuleField::Unknown(_) => None,
        }
    }

    // Amounts compare as decimals directly, text fields only if they parse.
    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Amount(amount) => Some(*amount),
            FieldValue::Text(text) => parse_decimal(text),
        }
    }

    fn as_text(&self) -> Cow<'a, str> {
        match self {
            FieldValue::Amount(amount) => Cow::Owned(amount.to_string()),
            FieldValue::Text(text) => Cow::Borrowed(text),
        }
    }
}

/// Parse a numeric operand, accepting `,` group separators (`"500,000"`)
pub(crate) fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if value.contains(',') {
        Decimal::from_str(&value.replace(',', "")).ok()
    } else {
        Decimal::from_str(value).ok()
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

fn list_contains(list: &str, needle: &str) -> bool {
    list.split(',').map(str::trim).any(|token| eq_ignore_case(token, needle))
}

/// Risk scorer
///
/// Holds no state; every call reads only its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    /// Create new risk scorer
    pub fn new() -> Self {
        Self
    }

    /// Score a transaction
    pub fn score<'a, I>(&self, transaction: &Transaction, rules: I) -> RiskScore
    where
        I: IntoIterator<Item = &'a Rule>,
    {
        compute_risk_score(transaction, rules)
    }

    /// Score a transaction and record which rules matched
    pub fn assess(&self, transaction: &Transaction, rules: &[Rule]) -> RiskAssessment {
        let matched_rules = rules
            .iter()
            .filter(|rule| rule.is_enabled && rule_matches(rule, transaction))
            .map(|rule| rule.id)
            .collect();

        RiskAssessment {
            transaction_id: transaction.id,
            risk_score: compute_risk_score(transaction, rules),
            matched_rules,
            assessed_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn transaction(amount: Decimal) -> Transaction {
        Transaction::new("ACC0000001", "ACC0000002", "Transfer", amount)
    }

    #[test]
    fn test_empty_rules_score_zero() {
        let tx = transaction(dec!(1000000));
        assert_eq!(compute_risk_score(&tx, Vec::<Rule>::new().iter()), RiskScore::ZERO);
    }

    #[test]
    fn test_amount_greater_than() {
        let rule = Rule::new("High Value", "Amount", "GreaterThan", "500000");

        assert_eq!(compute_risk_score(&transaction(dec!(600000)), [&rule]).score(), 50);
        assert_eq!(compute_risk_score(&transaction(dec!(500000)), [&rule]).score(), 0);
        assert_eq!(compute_risk_score(&transaction(dec!(500000.01)), [&rule]).score(), 50);
    }

    #[test]
    fn test_two_matches_reach_cap() {
        let rules = vec![
            Rule::new("High Value", "Amount", "GreaterThan", "500000"),
            Rule::new("Transfer", "TransactionType", "Equals", "transfer"),
        ];

        assert_eq!(compute_risk_score(&transaction(dec!(600000)), &rules), RiskScore::MAX);
    }

    #[test]
    fn test_three_matches_are_capped() {
        let tx = transaction(dec!(600000)).with_device("NewDevice");
        let rules = vec![
            Rule::new("High Value", "Amount", "GreaterThan", "500000"),
            Rule::new("Transfer", "TransactionType", "Equals", "Transfer"),
            Rule::new("New Device", "Device", "Equals", "NewDevice"),
        ];

        assert_eq!(RiskScorer::new().assess(&tx, &rules).matched_rules.len(), 3);
        assert_eq!(compute_risk_score(&tx, &rules).score(), 100);
    }

    #[test]
    fn test_equals_is_case_insensitive() {
        let rule = Rule::new("New Device", "Device", "Equals", "NewDevice");
        let tx = transaction(dec!(10)).with_device("newdevice");

        assert!(rule_matches(&rule, &tx));
        assert_eq!(compute_risk_score(&tx, [&rule]).score(), 50);
    }

    #[test]
    fn test_in_trims_tokens() {
        let rule = Rule::new("Hotspots", "Location", "In", "NG-LAGOS, NG-ABUJA");

        assert!(rule_matches(&rule, &transaction(dec!(10)).with_location("NG-ABUJA")));
        assert!(rule_matches(&rule, &transaction(dec!(10)).with_location("ng-lagos")));
        assert!(!rule_matches(&rule, &transaction(dec!(10)).with_location("NG-KANO")));
    }

    #[test]
    fn test_not_in() {
        let rule = Rule::new("Unusual Type", "TransactionType", "NotIn", "Transfer,Payment");

        assert!(!rule_matches(&rule, &transaction(dec!(10))));

        let mut withdrawal = transaction(dec!(10));
        withdrawal.transaction_type = "Withdrawal".to_string();
        assert!(rule_matches(&rule, &withdrawal));
    }

    #[test]
    fn test_missing_device_reads_as_empty() {
        let not_in = Rule::new("Known Devices", "Device", "NotIn", "iOS,Android");
        let equals = Rule::new("New Device", "Device", "Equals", "NewDevice");
        let tx = transaction(dec!(10));

        assert!(rule_matches(&not_in, &tx));
        assert!(!rule_matches(&equals, &tx));
    }

    #[test]
    fn test_malformed_threshold_never_matches() {
        let rule = Rule::new("Broken", "Amount", "GreaterThan", "abc");
        assert_eq!(compute_risk_score(&transaction(dec!(999999999)), [&rule]).score(), 0);
    }

    #[test]
    fn test_grouped_threshold() {
        let rule = Rule::new("High Value", "Amount", "GreaterThan", "500,000");

        assert!(rule_matches(&rule, &transaction(dec!(600000))));
        assert!(!rule_matches(&rule, &transaction(dec!(500000))));
        assert_eq!(parse_decimal(" 1,250,000.50 "), Some(dec!(1250000.50)));
        assert_eq!(parse_decimal(","), None);
    }

    #[test]
    fn test_greater_than_on_text_field_requires_number() {
        let rule = Rule::new("Numeric Device", "Device", "GreaterThan", "100");

        assert!(rule_matches(&rule, &transaction(dec!(1)).with_device("150")));
        assert!(!rule_matches(&rule, &transaction(dec!(1)).with_device("Android")));
    }

    #[test]
    fn test_amount_equality_uses_decimal_text() {
        let rule = Rule::new("Exact", "Amount", "Equals", "600000.50");
        assert!(rule_matches(&rule, &transaction(dec!(600000.50))));

        let listed = Rule::new("Listed", "Amount", "In", "100, 200");
        assert!(rule_matches(&listed, &transaction(dec!(200))));
    }

    #[test]
    fn test_unknown_field_or_condition_never_matches() {
        let tx = transaction(dec!(600000));
        let rules = vec![
            Rule::new("Status", "Status", "NotIn", "Approved"),
            Rule::new("Spaced", "Amount", "greater than", "10"),
        ];

        assert!(rules.iter().all(|rule| !rule_matches(rule, &tx)));
        assert_eq!(compute_risk_score(&tx, &rules), RiskScore::ZERO);
    }

    #[test]
    fn test_disabled_rule_never_contributes() {
        let rule = Rule::new("High Value", "Amount", "GreaterThan", "500000").enabled(false);
        let tx = transaction(dec!(600000));

        assert!(rule_matches(&rule, &tx));
        assert_eq!(compute_risk_score(&tx, [&rule]), RiskScore::ZERO);
        assert!(RiskScorer::new().assess(&tx, &[rule]).matched_rules.is_empty());
    }
}
