use chrono::{DateTime, Utc};
use risk_engine::{RiskScore, Transaction, TriggeredRule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{MonitorError, MonitorResult};

/// Incoming transaction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender_account_number: String,
    pub receiver_account_number: String,
    pub transaction_type: String,
    pub amount: Decimal,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl TransactionRequest {
    pub fn validate(&self) -> MonitorResult<()> {
        if self.sender_account_number.trim().is_empty() {
            return Err(MonitorError::Validation("sender account number is required".to_string()));
        }
        if self.receiver_account_number.trim().is_empty() {
            return Err(MonitorError::Validation("receiver account number is required".to_string()));
        }
        if self.transaction_type.trim().is_empty() {
            return Err(MonitorError::Validation("transaction type is required".to_string()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(MonitorError::Validation(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    pub fn into_transaction(self) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            sender_account_number: self.sender_account_number,
            receiver_account_number: self.receiver_account_number,
            transaction_type: self.transaction_type,
            amount: self.amount,
            location: self.location,
            device: self.device,
            ip_address: self.ip_address,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Normal,
    Flagged,
}

impl TransactionStatus {
    pub fn from_flag(is_flagged: bool) -> Self {
        if is_flagged {
            TransactionStatus::Flagged
        } else {
            TransactionStatus::Normal
        }
    }
}

/// Transaction together with the outcome of scoring it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub risk_score: RiskScore,
    pub is_flagged: bool,
    pub status: TransactionStatus,
}

impl ScoredTransaction {
    pub fn id(&self) -> Uuid {
        self.transaction.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertStatus {
    Pending,
    InReview,
    Escalated,
    Resolved,
}

impl AlertStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Resolved)
    }

    /// Terminal states only accept a same-state update
    pub fn can_transition_to(&self, next: AlertStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub rule_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    Open,
    UnderInvestigation,
    Closed,
    Confirmed,
    Fraud,
    FalsePositive,
}

impl CaseStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CaseStatus::Closed | CaseStatus::Confirmed | CaseStatus::Fraud | CaseStatus::FalsePositive
        )
    }

    pub fn can_transition_to(&self, next: CaseStatus) -> bool {
        *self == next || !self.is_terminal()
    }

    /// Alert status implied by a case in this state
    pub fn alert_status(&self) -> AlertStatus {
        match self {
            CaseStatus::Open => AlertStatus::Pending,
            CaseStatus::UnderInvestigation => AlertStatus::InReview,
            _ => AlertStatus::Resolved,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub transaction_id: Uuid,
    pub investigator_id: Option<Uuid>,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Account summary derived from stored transaction history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyProfile {
    pub name: String,
    pub account_number: String,
    pub customer_since: DateTime<Utc>,
    pub average_transaction_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub transaction: ScoredTransaction,
    pub triggered_rules: Vec<TriggeredRule>,
    pub alerts: Vec<Alert>,
    pub sender: Option<CounterpartyProfile>,
    pub receiver: Option<CounterpartyProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal) -> TransactionRequest {
        TransactionRequest {
            sender_account_number: "ACC1000001".to_string(),
            receiver_account_number: "ACC1000002".to_string(),
            transaction_type: "Transfer".to_string(),
            amount,
            location: None,
            device: Some("iOS".to_string()),
            ip_address: None,
        }
    }

    #[test]
    fn test_request_validation() {
        assert!(request(dec!(100)).validate().is_ok());
        assert!(matches!(
            request(dec!(0)).validate(),
            Err(MonitorError::Validation(_))
        ));

        let mut blank = request(dec!(100));
        blank.transaction_type = "  ".to_string();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_request_accepts_numeric_amount() {
        let json = r#"{
            "sender_account_number": "ACC1",
            "receiver_account_number": "ACC2",
            "transaction_type": "Transfer",
            "amount": 600000
        }"#;
        let request: TransactionRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.amount, dec!(600000));
        assert!(request.device.is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(AlertStatus::Pending.can_transition_to(AlertStatus::Escalated));
        assert!(AlertStatus::Resolved.can_transition_to(AlertStatus::Resolved));
        assert!(!AlertStatus::Resolved.can_transition_to(AlertStatus::InReview));

        assert!(CaseStatus::Open.can_transition_to(CaseStatus::Fraud));
        assert!(!CaseStatus::FalsePositive.can_transition_to(CaseStatus::Open));
    }

    #[test]
    fn test_case_status_drives_alert_status() {
        assert_eq!(CaseStatus::Open.alert_status(), AlertStatus::Pending);
        assert_eq!(CaseStatus::UnderInvestigation.alert_status(), AlertStatus::InReview);
        assert_eq!(CaseStatus::Confirmed.alert_status(), AlertStatus::Resolved);
    }
}
