//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod audit_log;
pub mod billing_rule;
pub mod client;
pub mod employee_allocation;
pub mod invoice;
pub mod invoice_line_item;
pub mod rate;
pub mod service;
pub mod time_entry;
pub mod user;

// Re-export specific types to avoid conflicts
pub use audit_log::{
    AuditAction, Column as AuditLogColumn, Entity as AuditLog, Model as AuditLogModel,
};
pub use billing_rule::{
    BillingRuleKind, Column as BillingRuleColumn, Entity as BillingRule,
    Model as BillingRuleModel,
};
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use employee_allocation::{
    Column as EmployeeAllocationColumn, Entity as EmployeeAllocation,
    Model as EmployeeAllocationModel,
};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, InvoiceStatus, Model as InvoiceModel};
pub use invoice_line_item::{
    Column as InvoiceLineItemColumn, Entity as InvoiceLineItem, LineItemType,
    Model as InvoiceLineItemModel,
};
pub use rate::{Column as RateColumn, Entity as Rate, Model as RateModel};
pub use service::{Column as ServiceColumn, Entity as Service, Model as ServiceModel};
pub use time_entry::{
    Column as TimeEntryColumn, Entity as TimeEntry, EntryStatus, Model as TimeEntryModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, UserRole};
