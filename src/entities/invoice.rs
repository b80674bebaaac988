//! Invoice entity - A snapshot of billable work for one client over a date range.
//!
//! Amounts are copied from time entries at generation time; later edits to those
//! entries do not change an issued invoice. Line items live and die with their invoice.

use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Generated, not yet sent to the client
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Delivered to the client
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Settled
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl InvoiceStatus {
    /// Lowercase name used in storage and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier for the invoice
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-facing number, e.g. `INV-2026-000042`
    #[sea_orm(unique)]
    pub invoice_number: String,
    /// Client being billed
    pub client_id: i64,
    /// First day covered (inclusive)
    pub start_date: Date,
    /// Last day covered (inclusive)
    pub end_date: Date,
    /// Sum of line item amounts
    pub subtotal: f64,
    /// Amount due; equals the subtotal (no tax or discounts)
    pub total: f64,
    /// Lifecycle status
    pub status: InvoiceStatus,
    /// Administrator who generated the invoice
    pub created_by: i64,
    /// When the invoice was generated
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each invoice bills one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    /// One invoice owns many line items
    #[sea_orm(has_many = "super::invoice_line_item::Entity")]
    LineItems,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::invoice_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
