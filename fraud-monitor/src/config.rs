use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::errors::{MonitorError, MonitorResult};
use crate::policy::{DEFAULT_FLAG_THRESHOLD, DEFAULT_HIGH_SEVERITY_THRESHOLD};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub policy: PolicyConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    pub simulator: SimulatorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PolicyConfig {
    pub flag_threshold: u8,
    pub high_severity_threshold: u8,
    pub new_payee_amount: Decimal,
    pub currency_symbol: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct RulesConfig {
    /// JSON file holding an array of rule drafts; seed rules are used when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulatorConfig {
    pub count: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            flag_threshold: DEFAULT_FLAG_THRESHOLD,
            high_severity_threshold: DEFAULT_HIGH_SEVERITY_THRESHOLD,
            new_payee_amount: Decimal::from(100_000),
            currency_symbol: "₦".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> MonitorResult<Self> {
        dotenv::dotenv().ok();

        let file = env::var("FRAUD_MONITOR_CONFIG").ok();
        let config = Self::build(file.as_deref(), Environment::with_prefix("FRAUD_MONITOR").separator("__"))?;
        config.validate()?;
        Ok(config)
    }

    fn build(file: Option<&str>, environment: Environment) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            // Policy defaults
            .set_default("policy.flag_threshold", DEFAULT_FLAG_THRESHOLD as i64)?
            .set_default("policy.high_severity_threshold", DEFAULT_HIGH_SEVERITY_THRESHOLD as i64)?
            .set_default("policy.new_payee_amount", "100000")?
            .set_default("policy.currency_symbol", "₦")?
            // Simulator defaults
            .set_default("simulator.count", 20_i64)?
            // Logging defaults
            .set_default("logging.filter", "fraud_monitor=info,risk_engine=info")?
            .set_default("logging.json", false)?;

        if let Some(path) = file {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(environment);

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> MonitorResult<()> {
        let policy = &self.policy;

        if policy.high_severity_threshold > 100 {
            return Err(MonitorError::InvalidConfiguration(format!(
                "high_severity_threshold {} exceeds 100",
                policy.high_severity_threshold
            )));
        }
        if policy.flag_threshold > policy.high_severity_threshold {
            return Err(MonitorError::InvalidConfiguration(format!(
                "flag_threshold {} is above high_severity_threshold {}",
                policy.flag_threshold, policy.high_severity_threshold
            )));
        }
        if policy.new_payee_amount < Decimal::ZERO {
            return Err(MonitorError::InvalidConfiguration(
                "new_payee_amount must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::io::Write;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("FRAUD_MONITOR")
            .separator("__")
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = Config::build(None, environment(&[])).unwrap();

        assert_eq!(config.policy.flag_threshold, 70);
        assert_eq!(config.policy.high_severity_threshold, 90);
        assert_eq!(config.policy.new_payee_amount, dec!(100000));
        assert_eq!(config.simulator.count, 20);
        assert!(config.rules.path.is_none());
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::build(
            None,
            environment(&[
                ("FRAUD_MONITOR__POLICY__FLAG_THRESHOLD", "50"),
                ("FRAUD_MONITOR__RULES__PATH", "/etc/fdma/rules.json"),
                ("FRAUD_MONITOR__SIMULATOR__SEED", "7"),
            ]),
        )
        .unwrap();

        assert_eq!(config.policy.flag_threshold, 50);
        assert_eq!(config.rules.path, Some(PathBuf::from("/etc/fdma/rules.json")));
        assert_eq!(config.simulator.seed, Some(7));
    }

    #[test]
    fn test_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[policy]\nhigh_severity_threshold = 95\n\n[simulator]\ncount = 5").unwrap();

        let config = Config::build(file.path().to_str(), environment(&[])).unwrap();

        assert_eq!(config.policy.high_severity_threshold, 95);
        assert_eq!(config.policy.flag_threshold, 70);
        assert_eq!(config.simulator.count, 5);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let mut config = Config::build(None, environment(&[])).unwrap();
        config.policy.flag_threshold = 95;

        assert!(matches!(
            config.validate(),
            Err(MonitorError::InvalidConfiguration(_))
        ));
    }
}
