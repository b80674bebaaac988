//! Billing rule entity - Named default charge templates (travel, allowance, other)
//! used when composing additional invoice charges.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of charge a billing rule describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BillingRuleKind {
    /// Travel costs
    #[sea_orm(string_value = "travel")]
    Travel,
    /// Per-diem or similar allowance
    #[sea_orm(string_value = "allowance")]
    Allowance,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

/// Billing rule database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "billing_rules")]
pub struct Model {
    /// Unique identifier for the rule
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Rule name, used as the default line item description
    #[sea_orm(unique)]
    pub name: String,
    /// Charge kind
    pub kind: BillingRuleKind,
    /// Default charge amount
    pub default_amount: f64,
    /// Inactive rules are kept for history but not offered
    pub is_active: bool,
}

/// `BillingRule` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
