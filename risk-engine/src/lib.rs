//! Risk Engine for FDMA
//!
//! Rule-based risk scoring for monitored transactions. Every enabled rule that
//! matches a transaction adds a fixed increment to its score, capped at 100.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod explain;
pub mod rule;
pub mod scoring;
pub mod types;

pub use error::{Error, Result};
pub use explain::{RuleExplainer, TriggeredRule};
pub use rule::{Rule, RuleCondition, RuleDraft, RuleField};
pub use scoring::{compute_risk_score, rule_matches, RiskScorer, RULE_MATCH_INCREMENT};
pub use types::*;
