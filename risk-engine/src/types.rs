//! Core types for risk engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Risk score (0-100)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct RiskScore(u8);

impl RiskScore {
    /// Highest possible score
    pub const MAX: RiskScore = RiskScore(100);

    /// Lowest possible score
    pub const ZERO: RiskScore = RiskScore(0);

    /// Create new risk score (0-100)
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Create a score from an accumulated point total, capping at 100
    pub fn from_points(points: u32) -> Self {
        Self(points.min(100) as u8)
    }

    /// Get raw score
    pub fn score(&self) -> u8 {
        self.0
    }

    /// Check if at or above a threshold
    pub fn reaches(&self, threshold: u8) -> bool {
        self.0 >= threshold
    }
}

impl From<u8> for RiskScore {
    fn from(score: u8) -> Self {
        Self::new(score)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction as seen by the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID
    pub id: Uuid,

    /// Sending account
    pub sender_account_number: String,

    /// Receiving account
    pub receiver_account_number: String,

    /// Transaction type (Transfer, Card, CashIn, ...)
    pub transaction_type: String,

    /// Amount
    pub amount: Decimal,

    /// Location code, e.g. NG-LAGOS
    pub location: Option<String>,

    /// Device label
    pub device: Option<String>,

    /// Originating IP address
    pub ip_address: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a transaction with no location, device or address
    pub fn new(
        sender_account_number: impl Into<String>,
        receiver_account_number: impl Into<String>,
        transaction_type: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_account_number: sender_account_number.into(),
            receiver_account_number: receiver_account_number.into(),
            transaction_type: transaction_type.into(),
            amount,
            location: None,
            device: None,
            ip_address: None,
            created_at: Utc::now(),
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the device
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }
}

/// Risk assessment result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Transaction ID
    pub transaction_id: Uuid,

    /// Risk score
    pub risk_score: RiskScore,

    /// Enabled rules that matched
    pub matched_rules: Vec<Uuid>,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}
