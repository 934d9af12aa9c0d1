//! Rule definitions
//!
//! Rules are stored with free-form field and condition names. They are parsed
//! case-insensitively into closed enums; anything unrecognised lands in an
//! `Unknown` variant, which the scorer treats as a rule that never matches.

use crate::scoring::parse_decimal;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transaction attribute a rule inspects
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleField {
    /// Transaction amount
    Amount,
    /// Device label
    Device,
    /// Location code
    Location,
    /// Transaction type
    TransactionType,
    /// Unrecognised field name, kept verbatim
    Unknown(String),
}

impl RuleField {
    /// Parse a stored field name (case-insensitive)
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "amount" => RuleField::Amount,
            "device" => RuleField::Device,
            "location" => RuleField::Location,
            "transactiontype" => RuleField::TransactionType,
            _ => RuleField::Unknown(name.to_string()),
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &str {
        match self {
            RuleField::Amount => "Amount",
            RuleField::Device => "Device",
            RuleField::Location => "Location",
            RuleField::TransactionType => "TransactionType",
            RuleField::Unknown(name) => name,
        }
    }

    /// Whether the scorer can read this field
    pub fn is_known(&self) -> bool {
        !matches!(self, RuleField::Unknown(_))
    }
}

impl From<&str> for RuleField {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for RuleField {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<RuleField> for String {
    fn from(field: RuleField) -> Self {
        field.as_str().to_string()
    }
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleCondition {
    /// Numeric strictly-greater-than
    GreaterThan,
    /// Case-insensitive equality
    Equals,
    /// Membership in a comma-separated list
    In,
    /// Absence from a comma-separated list
    NotIn,
    /// Unrecognised condition name, kept verbatim
    Unknown(String),
}

impl RuleCondition {
    /// Parse a stored condition name (case-insensitive)
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "greaterthan" => RuleCondition::GreaterThan,
            "equals" => RuleCondition::Equals,
            "in" => RuleCondition::In,
            "notin" => RuleCondition::NotIn,
            _ => RuleCondition::Unknown(name.to_string()),
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &str {
        match self {
            RuleCondition::GreaterThan => "GreaterThan",
            RuleCondition::Equals => "Equals",
            RuleCondition::In => "In",
            RuleCondition::NotIn => "NotIn",
            RuleCondition::Unknown(name) => name,
        }
    }

    /// Whether the scorer can evaluate this condition
    pub fn is_known(&self) -> bool {
        !matches!(self, RuleCondition::Unknown(_))
    }
}

impl From<&str> for RuleCondition {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for RuleCondition {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<RuleCondition> for String {
    fn from(condition: RuleCondition) -> Self {
        condition.as_str().to_string()
    }
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured detection rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule ID
    pub id: Uuid,

    /// Display name, e.g. "High Value Transaction"
    pub name: String,

    /// Inspected field
    pub field: RuleField,

    /// Comparison operator
    pub condition: RuleCondition,

    /// Operand: a number for `GreaterThan`, a comma-separated list for `In`/`NotIn`
    pub value: String,

    /// Disabled rules never contribute to a score
    pub is_enabled: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Rule {
    /// Build an enabled rule without validation
    pub fn new(
        name: impl Into<String>,
        field: impl Into<RuleField>,
        condition: impl Into<RuleCondition>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            field: field.into(),
            condition: condition.into(),
            value: value.into(),
            is_enabled: true,
            created_at: Utc::now(),
        }
    }

    /// Same rule with the given enablement
    pub fn enabled(mut self, is_enabled: bool) -> Self {
        self.is_enabled = is_enabled;
        self
    }
}

/// Rule creation or update payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDraft {
    /// Display name
    pub name: String,

    /// Field name as entered
    pub field: String,

    /// Condition name as entered
    pub condition: String,

    /// Operand
    pub value: String,

    /// Enablement; new rules default to enabled
    #[serde(default)]
    pub is_enabled: Option<bool>,
}

impl RuleDraft {
    /// Reject drafts the scorer could never evaluate
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::MissingName);
        }

        let field = RuleField::parse(&self.field);
        if !field.is_known() {
            return Err(Error::UnknownField(self.field.clone()));
        }

        let condition = RuleCondition::parse(&self.condition);
        if !condition.is_known() {
            return Err(Error::UnknownCondition(self.condition.clone()));
        }

        if self.value.trim().is_empty() {
            return Err(Error::EmptyValue(condition.to_string()));
        }

        if condition == RuleCondition::GreaterThan && parse_decimal(&self.value).is_none() {
            return Err(Error::InvalidThreshold(self.value.clone()));
        }

        Ok(())
    }

    /// Validate and build a new rule
    pub fn into_rule(self) -> Result<Rule> {
        self.validate()?;

        Ok(Rule {
            id: Uuid::new_v4(),
            field: RuleField::parse(&self.field),
            condition: RuleCondition::parse(&self.condition),
            name: self.name,
            value: self.value,
            is_enabled: self.is_enabled.unwrap_or(true),
            created_at: Utc::now(),
        })
    }
}
