//! Transaction monitor
//!
//! Scores incoming transactions against the enabled rules, applies the flag
//! policy and raises alerts. Alerts and investigation cases follow a simple
//! status lifecycle; case status changes carry over to the transaction's alerts.

use chrono::Utc;
use dashmap::DashMap;
use risk_engine::{RiskScore, RiskScorer, Rule, RuleExplainer, Transaction, TriggeredRule};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::errors::{MonitorError, MonitorResult};
use crate::models::{
    Alert, AlertSeverity, AlertStatus, Case, CaseStatus, CounterpartyProfile, ScoredTransaction,
    TransactionDetails, TransactionRequest, TransactionStatus,
};
use crate::policy::FlagPolicy;
use crate::rules::RuleBook;

/// Rule name recorded on alerts raised by automatic scoring
pub const AUTO_FLAG_RULE_NAME: &str = "RuleEngine:AutoFlag";

/// Name of the first-payment heuristic in transaction details
pub const NEW_PAYEE_RULE_NAME: &str = "New Payee - High Value";

pub struct TransactionMonitor {
    rules: Arc<RuleBook>,
    scorer: RiskScorer,
    explainer: RuleExplainer,
    policy: FlagPolicy,
    new_payee_amount: Decimal,
    transactions: DashMap<Uuid, ScoredTransaction>,
    alerts: DashMap<Uuid, Alert>,
    cases: DashMap<Uuid, Case>,
}

/// Totals across everything the monitor has seen
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSummary {
    pub transactions: usize,
    pub flagged: usize,
    pub alerts_by_severity: BTreeMap<AlertSeverity, usize>,
    pub open_cases: usize,
}

impl TransactionMonitor {
    pub fn new(rules: Arc<RuleBook>, policy: FlagPolicy) -> Self {
        Self::from_config(rules, policy, &PolicyConfig::default())
    }

    pub fn from_config(rules: Arc<RuleBook>, policy: FlagPolicy, config: &PolicyConfig) -> Self {
        Self {
            rules,
            scorer: RiskScorer::new(),
            explainer: RuleExplainer::new(config.currency_symbol.clone()),
            policy,
            new_payee_amount: config.new_payee_amount,
            transactions: DashMap::new(),
            alerts: DashMap::new(),
            cases: DashMap::new(),
        }
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    fn score(&self, transaction: Transaction, rules: &[Rule]) -> ScoredTransaction {
        let risk_score = self.scorer.score(&transaction, rules);
        let is_flagged = self.policy.is_flagged(risk_score);

        ScoredTransaction {
            transaction,
            risk_score,
            is_flagged,
            status: self.policy.transaction_status(risk_score),
        }
    }

    /// Score, store and, when flagged, alert on a new transaction
    pub fn submit(&self, request: TransactionRequest) -> MonitorResult<ScoredTransaction> {
        request.validate()?;

        let rules = self.rules.enabled();
        let scored = self.score(request.into_transaction(), &rules);

        info!(
            "Transaction {} scored {} against {} rules",
            scored.id(),
            scored.risk_score,
            rules.len()
        );

        self.transactions.insert(scored.id(), scored.clone());

        if scored.is_flagged {
            warn!(
                "Transaction {} flagged (score: {}, sender: {})",
                scored.id(),
                scored.risk_score,
                scored.transaction.sender_account_number
            );
            self.raise_alert(&scored);
        }

        Ok(scored)
    }

    fn raise_alert(&self, scored: &ScoredTransaction) -> Option<Alert> {
        let severity = self.policy.alert_severity(scored.risk_score)?;
        let alert = Alert {
            id: Uuid::new_v4(),
            transaction_id: scored.id(),
            severity,
            status: AlertStatus::Pending,
            rule_name: Some(AUTO_FLAG_RULE_NAME.to_string()),
            created_at: Utc::now(),
        };

        info!(
            "Alert {} raised for transaction {} (severity: {})",
            alert.id, alert.transaction_id, alert.severity
        );
        self.alerts.insert(alert.id, alert.clone());
        Some(alert)
    }

    pub fn transaction(&self, id: Uuid) -> Option<ScoredTransaction> {
        self.transactions.get(&id).map(|entry| entry.value().clone())
    }

    /// Transactions involving an account, newest first, scored against the
    /// current rules without persisting the result
    pub fn account_history(&self, account: &str) -> Vec<ScoredTransaction> {
        let rules = self.rules.enabled();
        let mut history: Vec<ScoredTransaction> = self
            .transactions
            .iter()
            .filter(|entry| involves(&entry.transaction, account))
            .map(|entry| self.score(entry.transaction.clone(), &rules))
            .collect();

        history.sort_by(|a, b| b.transaction.created_at.cmp(&a.transaction.created_at));
        history
    }

    /// Re-score every stored transaction against the current rules.
    ///
    /// Returns how many transactions changed flag state. Newly flagged
    /// transactions without an alert get one.
    pub fn rescore_all(&self) -> usize {
        let rules = self.rules.enabled();
        let mut changed = 0;
        let mut newly_flagged = Vec::new();

        for mut entry in self.transactions.iter_mut() {
            let rescored = self.score(entry.transaction.clone(), &rules);
            if rescored.is_flagged != entry.is_flagged {
                changed += 1;
                if rescored.is_flagged {
                    newly_flagged.push(rescored.clone());
                }
            }
            *entry.value_mut() = rescored;
        }

        for scored in newly_flagged {
            if self.alerts_for(scored.id()).is_empty() {
                self.raise_alert(&scored);
            }
        }

        debug!("Rescored {} transactions, {} changed flag state", self.transactions.len(), changed);
        changed
    }

    /// Analyst override of the flag
    pub fn set_flag(&self, id: Uuid, is_flagged: bool) -> MonitorResult<ScoredTransaction> {
        let mut entry = self
            .transactions
            .get_mut(&id)
            .ok_or_else(|| MonitorError::not_found("Transaction", id))?;

        entry.is_flagged = is_flagged;
        entry.status = TransactionStatus::from_flag(is_flagged);

        info!("Transaction {} manually {}", id, if is_flagged { "flagged" } else { "cleared" });
        Ok(entry.value().clone())
    }

    pub fn details(&self, id: Uuid) -> MonitorResult<TransactionDetails> {
        let stored = self
            .transaction(id)
            .ok_or_else(|| MonitorError::not_found("Transaction", id))?;

        let rules = self.rules.enabled();
        let scored = self.score(stored.transaction, &rules);
        let mut triggered_rules = self.explainer.explain(&scored.transaction, &rules);

        if scored.transaction.amount > self.new_payee_amount && self.is_first_payment(&scored.transaction) {
            triggered_rules.push(TriggeredRule {
                rule_id: None,
                name: NEW_PAYEE_RULE_NAME.to_string(),
                description: format!(
                    "First-time payment to this recipient exceeded the {} threshold.",
                    self.explainer.format_amount(self.new_payee_amount)
                ),
            });
        }

        Ok(TransactionDetails {
            alerts: self.alerts_for(id),
            sender: self.counterparty(&scored.transaction.sender_account_number),
            receiver: self.counterparty(&scored.transaction.receiver_account_number),
            transaction: scored,
            triggered_rules,
        })
    }

    fn is_first_payment(&self, transaction: &Transaction) -> bool {
        !self.transactions.iter().any(|entry| {
            entry.transaction.id != transaction.id
                && entry.transaction.sender_account_number == transaction.sender_account_number
                && entry.transaction.receiver_account_number == transaction.receiver_account_number
        })
    }

    fn counterparty(&self, account: &str) -> Option<CounterpartyProfile> {
        let history: Vec<(chrono::DateTime<Utc>, Decimal)> = self
            .transactions
            .iter()
            .filter(|entry| involves(&entry.transaction, account))
            .map(|entry| (entry.transaction.created_at, entry.transaction.amount))
            .collect();

        let customer_since = history.iter().map(|(at, _)| *at).min()?;
        let count = Decimal::from(history.len());
        let average_transaction_value = history
            .iter()
            .try_fold(Decimal::ZERO, |total, (_, amount)| total.checked_add(*amount))
            .map(|total| total / count)
            .unwrap_or_else(|| {
                history
                    .iter()
                    .fold(Decimal::ZERO, |average, (_, amount)| average.saturating_add(*amount / count))
            });
        let suffix_start = account.len().saturating_sub(5);

        Some(CounterpartyProfile {
            name: format!("Customer {}", account.get(suffix_start..).unwrap_or(account)),
            account_number: account.to_string(),
            customer_since,
            average_transaction_value,
        })
    }

    pub fn alert(&self, id: Uuid) -> Option<Alert> {
        self.alerts.get(&id).map(|entry| entry.value().clone())
    }

    /// Alerts raised for a transaction, oldest first
    pub fn alerts_for(&self, transaction_id: Uuid) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .iter()
            .filter(|entry| entry.transaction_id == transaction_id)
            .map(|entry| entry.value().clone())
            .collect();
        alerts.sort_by_key(|alert| alert.created_at);
        alerts
    }

    pub fn update_alert_status(&self, id: Uuid, status: AlertStatus) -> MonitorResult<Alert> {
        let mut entry = self
            .alerts
            .get_mut(&id)
            .ok_or_else(|| MonitorError::not_found("Alert", id))?;

        if !entry.status.can_transition_to(status) {
            return Err(MonitorError::InvalidTransition {
                from: entry.status.to_string(),
                to: status.to_string(),
            });
        }

        info!("Alert {} status: {} -> {}", id, entry.status, status);
        entry.status = status;
        Ok(entry.value().clone())
    }

    pub fn resolve_alert(&self, id: Uuid) -> MonitorResult<Alert> {
        self.update_alert_status(id, AlertStatus::Resolved)
    }

    /// Sender accounts with the most alerts, highest first
    pub fn top_accounts(&self, top_n: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for alert in self.alerts.iter() {
            if let Some(tx) = self.transactions.get(&alert.transaction_id) {
                *counts.entry(tx.transaction.sender_account_number.clone()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top_n);
        ranked
    }

    /// Open an investigation case; the transaction must score above zero
    /// against the currently enabled rules
    pub fn open_case(
        &self,
        transaction_id: Uuid,
        title: impl Into<String>,
        description: Option<String>,
        investigator_id: Option<Uuid>,
    ) -> MonitorResult<Case> {
        let scored = self
            .transaction(transaction_id)
            .ok_or_else(|| MonitorError::not_found("Transaction", transaction_id))?;

        let score = self.scorer.score(&scored.transaction, &self.rules.enabled());
        if score == RiskScore::ZERO {
            return Err(MonitorError::NotEligible(transaction_id));
        }

        let case = Case {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            transaction_id,
            investigator_id,
            status: CaseStatus::Open,
            created_at: Utc::now(),
            updated_at: None,
        };

        info!("Case {} opened for transaction {}", case.id, transaction_id);
        self.cases.insert(case.id, case.clone());
        Ok(case)
    }

    pub fn case(&self, id: Uuid) -> Option<Case> {
        self.cases.get(&id).map(|entry| entry.value().clone())
    }

    pub fn update_case_status(&self, id: Uuid, status: CaseStatus) -> MonitorResult<Case> {
        let case = {
            let mut entry = self
                .cases
                .get_mut(&id)
                .ok_or_else(|| MonitorError::not_found("Case", id))?;

            if !entry.status.can_transition_to(status) {
                return Err(MonitorError::InvalidTransition {
                    from: entry.status.to_string(),
                    to: status.to_string(),
                });
            }

            info!("Case {} status: {} -> {}", id, entry.status, status);
            entry.status = status;
            entry.updated_at = Some(Utc::now());
            entry.value().clone()
        };

        self.sync_alerts(case.transaction_id, status.alert_status());
        Ok(case)
    }

    // Resolved alerts stay resolved.
    fn sync_alerts(&self, transaction_id: Uuid, status: AlertStatus) {
        for mut alert in self.alerts.iter_mut() {
            if alert.transaction_id == transaction_id && alert.status.can_transition_to(status) {
                alert.status = status;
            }
        }
    }

    pub fn summary(&self) -> MonitorSummary {
        let mut alerts_by_severity = BTreeMap::new();
        for alert in self.alerts.iter() {
            *alerts_by_severity.entry(alert.severity).or_insert(0) += 1;
        }

        MonitorSummary {
            transactions: self.transactions.len(),
            flagged: self.transactions.iter().filter(|entry| entry.is_flagged).count(),
            alerts_by_severity,
            open_cases: self.cases.iter().filter(|entry| !entry.status.is_terminal()).count(),
        }
    }
}

fn involves(transaction: &Transaction, account: &str) -> bool {
    transaction.sender_account_number == account || transaction.receiver_account_number == account
}
