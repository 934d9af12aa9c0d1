//! Property-based tests for scoring invariants
//!
//! These tests verify properties that must hold for every transaction and
//! rule set, not just the hand-picked cases in the unit tests.

use proptest::prelude::*;
use risk_engine::*;
use rust_decimal::Decimal;

// ============================================================================
// Generators
// ============================================================================

fn field_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Amount", "amount", "Device", "LOCATION", "TransactionType", "Status", "",
    ])
    .prop_map(str::to_string)
}

fn condition_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "GreaterThan", "equals", "In", "NOTIN", "greater than", "between",
    ])
    .prop_map(str::to_string)
}

fn rule_value() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..10_000_000i64).prop_map(|n| n.to_string()),
        Just("abc".to_string()),
        Just("NG-LAGOS, NG-ABUJA".to_string()),
        Just("iOS,Android,NewDevice".to_string()),
        Just("Transfer".to_string()),
        Just(String::new()),
    ]
}

fn arb_rule() -> impl Strategy<Value = Rule> {
    (field_name(), condition_name(), rule_value(), any::<bool>()).prop_map(
        |(field, condition, value, enabled)| {
            Rule::new("generated", field.as_str(), condition.as_str(), value).enabled(enabled)
        },
    )
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (
        (0i64..1_000_000_000i64),
        prop::option::of(prop::sample::select(vec!["iOS", "Android", "NewDevice", "150"])),
        prop::option::of(prop::sample::select(vec!["NG-LAGOS", "NG-ABUJA", "UK-LONDON"])),
        prop::sample::select(vec!["Transfer", "Withdrawal", "Deposit", "Payment"]),
    )
        .prop_map(|(cents, device, location, kind)| {
            let mut tx = Transaction::new("ACC1", "ACC2", kind, Decimal::new(cents, 2));
            tx.device = device.map(str::to_string);
            tx.location = location.map(str::to_string);
            tx
        })
}

// ============================================================================
// Score Invariants
// ============================================================================

proptest! {
    /// Property: Score always lies in 0..=100
    #[test]
    fn score_is_bounded(
        tx in arb_transaction(),
        rules in prop::collection::vec(arb_rule(), 0..12),
    ) {
        let score = compute_risk_score(&tx, &rules).score();
        prop_assert!(score <= 100);
    }

    /// Property: Empty rule set scores zero
    #[test]
    fn empty_rules_score_zero(tx in arb_transaction()) {
        prop_assert_eq!(compute_risk_score(&tx, Vec::<Rule>::new().iter()), RiskScore::ZERO);
    }

    /// Property: Score is a capped multiple of the per-match increment
    #[test]
    fn score_counts_matching_enabled_rules(
        tx in arb_transaction(),
        rules in prop::collection::vec(arb_rule(), 0..12),
    ) {
        let matches = rules
            .iter()
            .filter(|rule| rule.is_enabled && rule_matches(rule, &tx))
            .count() as u32;
        let expected = (matches * RULE_MATCH_INCREMENT).min(100) as u8;

        prop_assert_eq!(compute_risk_score(&tx, &rules).score(), expected);
    }

    /// Property: Enabling an extra rule never decreases the score
    #[test]
    fn enabling_rules_is_monotonic(
        tx in arb_transaction(),
        rules in prop::collection::vec(arb_rule(), 0..10),
        extra in arb_rule(),
    ) {
        let before = compute_risk_score(&tx, &rules);

        let mut extended = rules.clone();
        extended.push(extra.enabled(true));
        let after = compute_risk_score(&tx, &extended);

        prop_assert!(after >= before);
    }

    /// Property: Disabling a rule never increases the score
    #[test]
    fn disabling_rules_never_increases_score(
        tx in arb_transaction(),
        rules in prop::collection::vec(arb_rule(), 1..10),
        index in any::<prop::sample::Index>(),
    ) {
        let before = compute_risk_score(&tx, &rules);

        let mut reduced = rules.clone();
        let i = index.index(reduced.len());
        reduced[i].is_enabled = false;
        let after = compute_risk_score(&tx, &reduced);

        prop_assert!(after <= before);
    }

    /// Property: A disabled rule contributes nothing even when it matches
    #[test]
    fn disabled_rules_are_inert(
        tx in arb_transaction(),
        rules in prop::collection::vec(arb_rule(), 0..10),
        extra in arb_rule(),
    ) {
        let before = compute_risk_score(&tx, &rules);

        let mut extended = rules.clone();
        extended.push(extra.enabled(false));

        prop_assert_eq!(compute_risk_score(&tx, &extended), before);
    }

    /// Property: Rule order does not affect the score
    #[test]
    fn rule_order_is_irrelevant(
        tx in arb_transaction(),
        rules in prop::collection::vec(arb_rule(), 0..10),
    ) {
        let mut reversed = rules.clone();
        reversed.reverse();

        prop_assert_eq!(compute_risk_score(&tx, &rules), compute_risk_score(&tx, &reversed));
    }

    /// Property: Amount threshold compares by decimal value
    #[test]
    fn amount_threshold_matches_decimal_ordering(
        amount in 0i64..10_000_000i64,
        threshold in 0i64..10_000_000i64,
    ) {
        let tx = Transaction::new("ACC1", "ACC2", "Transfer", Decimal::new(amount, 2));
        let rule = Rule::new("threshold", "Amount", "GreaterThan", Decimal::new(threshold, 2).to_string());

        prop_assert_eq!(rule_matches(&rule, &tx), amount > threshold);
    }

    /// Property: Non-numeric thresholds never match
    #[test]
    fn malformed_threshold_never_matches(tx in arb_transaction(), junk in "[a-zA-Z ]{1,12}") {
        let rule = Rule::new("broken", "Amount", "GreaterThan", junk);
        prop_assert_eq!(compute_risk_score(&tx, [&rule]), RiskScore::ZERO);
    }
}
