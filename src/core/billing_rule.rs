//! Billing rule business logic - Default charge templates for invoices.

use sea_orm::{QueryOrder, Set, prelude::*};

use crate::{
    entities::{BillingRule, BillingRuleKind, billing_rule},
    errors::{Error, Result, ValidationErrors},
};

/// Retrieves all active billing rules, ordered by name.
pub async fn get_active_billing_rules(db: &DatabaseConnection) -> Result<Vec<billing_rule::Model>> {
    BillingRule::find()
        .filter(billing_rule::Column::IsActive.eq(true))
        .order_by_asc(billing_rule::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a billing rule by id.
pub async fn get_billing_rule_by_id(
    db: &DatabaseConnection,
    rule_id: i64,
) -> Result<Option<billing_rule::Model>> {
    BillingRule::find_by_id(rule_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a billing rule by exact name.
pub async fn get_billing_rule_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<billing_rule::Model>> {
    BillingRule::find()
        .filter(billing_rule::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an active billing rule.
///
/// # Errors
/// Returns a validation error for a blank name or a negative/non-finite amount, and
/// [`Error::DuplicateEntry`] if the name is taken.
pub async fn create_billing_rule(
    db: &DatabaseConnection,
    name: &str,
    kind: BillingRuleKind,
    default_amount: f64,
) -> Result<billing_rule::Model> {
    let name = name.trim();
    let mut errors = ValidationErrors::new();
    if name.is_empty() {
        errors.add("name", "Rule name is required");
    }
    if !default_amount.is_finite() || default_amount < 0.0 {
        errors.add("default_amount", "Amount must be a non-negative number");
    }
    errors.into_result()?;

    if get_billing_rule_by_name(db, name).await?.is_some() {
        return Err(Error::DuplicateEntry {
            message: format!("Billing rule '{name}' already exists"),
        });
    }

    let rule = billing_rule::ActiveModel {
        name: Set(name.to_string()),
        kind: Set(kind),
        default_amount: Set(default_amount),
        is_active: Set(true),
        ..Default::default()
    };
    rule.insert(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_billing_rules() -> Result<()> {
        let db = setup_test_db().await?;
        let travel = create_billing_rule(&db, "Travel", BillingRuleKind::Travel, 75.0).await?;
        create_billing_rule(&db, "Allowance", BillingRuleKind::Allowance, 40.0).await?;

        let rules = get_active_billing_rules(&db).await?;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "Allowance");

        let stored = get_billing_rule_by_id(&db, travel.id).await?;
        assert!(stored.is_some_and(|r| r.default_amount == 75.0));

        assert!(matches!(
            create_billing_rule(&db, "Travel", BillingRuleKind::Other, 1.0).await,
            Err(Error::DuplicateEntry { .. })
        ));
        assert!(matches!(
            create_billing_rule(&db, "Bad", BillingRuleKind::Other, -1.0).await,
            Err(Error::Validation(_))
        ));
        Ok(())
    }
}
