//! Application settings loading from config.toml
//!
//! The file names the issuing company, the invoice number prefix, and the reference
//! data (services with their default hourly rate, billing rules) seeded into the
//! database on startup. Seeding skips anything that already exists by name, so it
//! is safe to run on every start.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::{
    core::{
        billing_rule::{create_billing_rule, get_billing_rule_by_name},
        rate::{NewRate, create_rate},
        service::{create_service, get_service_by_name},
    },
    entities::BillingRuleKind,
    errors::{Error, Result},
};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "TIMELEDGER_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Issuing company details printed on invoices
    #[serde(default)]
    pub company: CompanySettings,
    /// Invoice numbering
    #[serde(default)]
    pub invoicing: InvoicingSettings,
    /// Services to seed
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    /// Billing rules to seed
    #[serde(default)]
    pub billing_rules: Vec<BillingRuleConfig>,
}

/// The company issuing invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CompanySettings {
    /// Legal name
    pub name: String,
    /// Postal address
    #[serde(default)]
    pub address: String,
}

/// Invoice numbering settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvoicingSettings {
    /// Prefix of every invoice number, e.g. `INV` in `INV-2026-000001`
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for InvoicingSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "INV".to_string()
}

/// A service to seed, with its default hourly rate.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Default hourly rate applied when no employee override exists
    pub default_rate: Option<f64>,
    /// First day the default rate applies; the seeding date when omitted
    pub effective_from: Option<NaiveDate>,
}

/// A billing rule to seed.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingRuleConfig {
    /// Rule name
    pub name: String,
    /// Charge kind
    pub kind: BillingRuleKind,
    /// Default charge amount
    pub default_amount: f64,
}

/// Loads application settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    parse_config(&contents)
}

/// Parses application settings from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `$TIMELEDGER_CONFIG`, or `./config.toml` when unset.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

/// What a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Services created
    pub services_created: usize,
    /// Default rates created alongside new services
    pub rates_created: usize,
    /// Billing rules created
    pub billing_rules_created: usize,
}

/// Inserts the configured services, default rates and billing rules that do not exist yet.
#[instrument(skip(db, config))]
pub async fn seed_reference_data(
    db: &DatabaseConnection,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for service in &config.services {
        if get_service_by_name(db, service.name.trim()).await?.is_some() {
            debug!("Service '{}' already exists, skipping", service.name);
            continue;
        }
        let created = create_service(db, &service.name, service.description.clone()).await?;
        summary.services_created += 1;

        if let Some(hourly_rate) = service.default_rate {
            create_rate(
                db,
                NewRate {
                    service_id: created.id,
                    employee_id: None,
                    hourly_rate,
                    effective_from: service.effective_from.unwrap_or_else(|| now.date_naive()),
                },
            )
            .await?;
            summary.rates_created += 1;
        }
    }

    for rule in &config.billing_rules {
        if get_billing_rule_by_name(db, rule.name.trim()).await?.is_some() {
            debug!("Billing rule '{}' already exists, skipping", rule.name);
            continue;
        }
        create_billing_rule(db, &rule.name, rule.kind, rule.default_amount).await?;
        summary.billing_rules_created += 1;
    }

    info!(
        "Seeded {} services, {} rates, {} billing rules",
        summary.services_created, summary.rates_created, summary.billing_rules_created
    );
    Ok(summary)
}
