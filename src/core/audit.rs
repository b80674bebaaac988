//! Audit log business logic.
//!
//! Every write in the core records who changed what through [`record_audit`], inside
//! the same database transaction as the change itself. Entries are append-only: this
//! module exposes no update or delete.
//!
//! By convention `create` entries carry only new values, `delete` entries only old
//! values, and `update` entries carry both sides restricted to the keys that changed
//! (see [`diff_values`]).

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    entities::{AuditAction, AuditLog, audit_log},
    errors::Result,
};

/// Data for one audit entry, before it is stamped and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditInput {
    /// User who made the change
    pub user_id: i64,
    /// Kind of change
    pub action: AuditAction,
    /// Kind of record changed, e.g. `"time_entry"`
    pub entity_type: String,
    /// Identifier of the changed record
    pub entity_id: i64,
    /// Values before the change
    pub old_values: Option<Value>,
    /// Values after the change
    pub new_values: Option<Value>,
}

impl AuditInput {
    /// Entry for a newly created record.
    pub fn created<T: Serialize>(
        user_id: i64,
        entity_type: &str,
        entity_id: i64,
        record: &T,
    ) -> Result<Self> {
        Ok(Self {
            user_id,
            action: AuditAction::Create,
            entity_type: entity_type.to_string(),
            entity_id,
            old_values: None,
            new_values: Some(serde_json::to_value(record)?),
        })
    }

    /// Entry for a changed record; only differing keys are kept.
    pub fn updated<T: Serialize>(
        user_id: i64,
        entity_type: &str,
        entity_id: i64,
        before: &T,
        after: &T,
    ) -> Result<Self> {
        let (old_values, new_values) =
            diff_values(&serde_json::to_value(before)?, &serde_json::to_value(after)?);
        Ok(Self {
            user_id,
            action: AuditAction::Update,
            entity_type: entity_type.to_string(),
            entity_id,
            old_values: Some(old_values),
            new_values: Some(new_values),
        })
    }

    /// Entry for a removed record.
    pub fn deleted<T: Serialize>(
        user_id: i64,
        entity_type: &str,
        entity_id: i64,
        record: &T,
    ) -> Result<Self> {
        Ok(Self {
            user_id,
            action: AuditAction::Delete,
            entity_type: entity_type.to_string(),
            entity_id,
            old_values: Some(serde_json::to_value(record)?),
            new_values: None,
        })
    }
}

/// Compares two JSON objects and returns `(old, new)` objects holding only the keys
/// whose values differ. A key missing on one side appears as `null` there.
///
/// Non-object inputs are returned whole when they differ and as empty objects when equal.
#[must_use]
pub fn diff_values(old: &Value, new: &Value) -> (Value, Value) {
    let (Value::Object(old_map), Value::Object(new_map)) = (old, new) else {
        if old == new {
            return (Value::Object(Map::new()), Value::Object(Map::new()));
        }
        return (old.clone(), new.clone());
    };

    let mut old_changed = Map::new();
    let mut new_changed = Map::new();

    for (key, old_value) in old_map {
        let new_value = new_map.get(key).unwrap_or(&Value::Null);
        if old_value != new_value {
            old_changed.insert(key.clone(), old_value.clone());
            new_changed.insert(key.clone(), new_value.clone());
        }
    }
    for (key, new_value) in new_map {
        if !old_map.contains_key(key) && !new_value.is_null() {
            old_changed.insert(key.clone(), Value::Null);
            new_changed.insert(key.clone(), new_value.clone());
        }
    }

    (Value::Object(old_changed), Value::Object(new_changed))
}

/// Stamps `input` with `now` and appends it to the log. The database assigns the id.
pub async fn record_audit<C>(
    db: &C,
    input: AuditInput,
    now: DateTime<Utc>,
) -> Result<audit_log::Model>
where
    C: ConnectionTrait,
{
    debug!(
        "Audit {} {} {} by user {}",
        input.action, input.entity_type, input.entity_id, input.user_id
    );
    let entry = audit_log::ActiveModel {
        user_id: Set(input.user_id),
        action: Set(input.action),
        entity_type: Set(input.entity_type),
        entity_id: Set(input.entity_id),
        old_values: Set(input.old_values),
        new_values: Set(input.new_values),
        timestamp: Set(now),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// Optional constraints for audit queries; all supplied constraints must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditLogFilter {
    /// Only changes made by this user
    pub user_id: Option<i64>,
    /// Only this kind of change
    pub action: Option<AuditAction>,
    /// Only this kind of record
    pub entity_type: Option<String>,
    /// Earliest day (inclusive)
    pub start_date: Option<NaiveDate>,
    /// Latest day (inclusive)
    pub end_date: Option<NaiveDate>,
}

impl AuditLogFilter {
    /// Whether `entry` satisfies every supplied constraint.
    #[must_use]
    pub fn matches(&self, entry: &audit_log::Model) -> bool {
        let day = entry.timestamp.date_naive();
        self.user_id.is_none_or(|id| entry.user_id == id)
            && self.action.is_none_or(|action| entry.action == action)
            && self
                .entity_type
                .as_deref()
                .is_none_or(|kind| entry.entity_type == kind)
            && self.start_date.is_none_or(|start| day >= start)
            && self.end_date.is_none_or(|end| day <= end)
    }
}

/// Returns the entries matching `filter`, in input order.
#[must_use]
pub fn filter_audit_logs<'a>(
    entries: &'a [audit_log::Model],
    filter: &AuditLogFilter,
) -> Vec<&'a audit_log::Model> {
    entries.iter().filter(|entry| filter.matches(entry)).collect()
}

/// Loads audit entries matching `filter`, newest first.
pub async fn list_audit_logs(
    db: &DatabaseConnection,
    filter: &AuditLogFilter,
) -> Result<Vec<audit_log::Model>> {
    let mut query = AuditLog::find();
    if let Some(user_id) = filter.user_id {
        query = query.filter(audit_log::Column::UserId.eq(user_id));
    }
    if let Some(action) = filter.action {
        query = query.filter(audit_log::Column::Action.eq(action));
    }
    if let Some(entity_type) = &filter.entity_type {
        query = query.filter(audit_log::Column::EntityType.eq(entity_type.as_str()));
    }

    let entries = query
        .order_by_desc(audit_log::Column::Timestamp)
        .order_by_desc(audit_log::Column::Id)
        .all(db)
        .await?;

    // Day-granular bounds are applied in memory so they match `filter_audit_logs` exactly
    Ok(entries
        .into_iter()
        .filter(|entry| filter.matches(entry))
        .collect())
}

/// Loads the full history of one record, oldest first.
pub async fn get_history_for_entity(
    db: &DatabaseConnection,
    entity_type: &str,
    entity_id: i64,
) -> Result<Vec<audit_log::Model>> {
    AuditLog::find()
        .filter(audit_log::Column::EntityType.eq(entity_type))
        .filter(audit_log::Column::EntityId.eq(entity_id))
        .order_by_asc(audit_log::Column::Timestamp)
        .order_by_asc(audit_log::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
