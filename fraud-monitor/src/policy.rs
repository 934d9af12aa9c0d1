//! Flagging and alert severity policy applied to risk scores

use risk_engine::RiskScore;

use crate::config::PolicyConfig;
use crate::models::{AlertSeverity, TransactionStatus};

pub const DEFAULT_FLAG_THRESHOLD: u8 = 70;
pub const DEFAULT_HIGH_SEVERITY_THRESHOLD: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPolicy {
    flag_threshold: u8,
    high_severity_threshold: u8,
}

impl FlagPolicy {
    pub fn new(flag_threshold: u8, high_severity_threshold: u8) -> Self {
        Self {
            flag_threshold,
            high_severity_threshold,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.flag_threshold, config.high_severity_threshold)
    }

    pub fn is_flagged(&self, score: RiskScore) -> bool {
        score.reaches(self.flag_threshold)
    }

    pub fn transaction_status(&self, score: RiskScore) -> TransactionStatus {
        TransactionStatus::from_flag(self.is_flagged(score))
    }

    /// Severity of the alert raised for a score, `None` when no alert is due
    pub fn alert_severity(&self, score: RiskScore) -> Option<AlertSeverity> {
        if !self.is_flagged(score) {
            None
        } else if score.reaches(self.high_severity_threshold) {
            Some(AlertSeverity::High)
        } else {
            Some(AlertSeverity::Medium)
        }
    }
}

impl Default for FlagPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FLAG_THRESHOLD, DEFAULT_HIGH_SEVERITY_THRESHOLD)
    }
}
