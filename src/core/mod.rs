/// Audit trail recording, diffing and filtering
pub mod audit;
/// Billing rule templates for additional charges
pub mod billing_rule;
/// Client directory
pub mod client;
/// Employee allocations and commission
pub mod commission;
/// Spreadsheet export of time entries
pub mod export;
/// Time entry filters for employee and administrator views
pub mod filter;
/// Invoice generation, numbering and lifecycle
pub mod invoice;
/// Outbound email templates and delivery
pub mod notification;
/// Hourly rate management and resolution
pub mod rate;
/// Hour and revenue aggregations
pub mod report;
/// Service catalog
pub mod service;
/// Time entry logging, editing and review
pub mod time_entry;
/// User accounts
pub mod user;
/// Field-level input validation
pub mod validation;
