//! Invoice business logic - Turns billable time into client invoices.
//!
//! An invoice snapshots the selected entries: each line copies the entry's amount as
//! it stood at generation time, so later edits never change an issued invoice.
//! Invoice numbers come from an [`InvoiceNumberSequence`] owned by the caller. It
//! guarantees uniqueness within one process; across processes the unique column on
//! `invoices.invoice_number` is the final guard.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    config::settings::CompanySettings,
    core::{
        audit::{AuditInput, record_audit},
        filter::AdminEntryFilter,
        time_entry::{list_time_entries, round_to_cents},
    },
    entities::{
        Client, Invoice, InvoiceLineItem, InvoiceStatus, LineItemType, billing_rule, client,
        invoice, invoice_line_item, time_entry,
    },
    errors::{Error, Result, ValidationErrors},
};

/// Attempts before allocation gives up with [`Error::DuplicateEntry`].
pub const MAX_NUMBER_ATTEMPTS: u32 = 1000;

const ENTITY_TYPE: &str = "invoice";

/// Formats an invoice number as `{prefix}-{year}-{6-digit sequence}`.
#[must_use]
pub fn format_invoice_number(prefix: &str, year: i32, sequence: u64) -> String {
    format!("{prefix}-{year}-{sequence:06}")
}

/// Extracts the sequence part of a number issued under `prefix`.
fn parse_sequence(prefix: &str, number: &str) -> Option<u64> {
    let rest = number.strip_prefix(prefix)?.strip_prefix('-')?;
    let (year, sequence) = rest.split_once('-')?;
    year.parse::<i32>().ok()?;
    sequence.parse().ok()
}

/// Monotonic invoice number generator for one process.
#[derive(Debug)]
pub struct InvoiceNumberSequence {
    prefix: String,
    next: AtomicU64,
}

impl InvoiceNumberSequence {
    /// Starts a sequence at 1.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    /// Starts a sequence at `first`.
    #[must_use]
    pub fn starting_at(prefix: impl Into<String>, first: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(first.max(1)),
        }
    }

    /// Starts a sequence just past the highest number already issued under `prefix`.
    #[must_use]
    pub fn after_existing<'a, I>(prefix: impl Into<String>, existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let prefix = prefix.into();
        let highest = existing
            .into_iter()
            .filter_map(|number| parse_sequence(&prefix, number))
            .max()
            .unwrap_or(0);
        Self::starting_at(prefix, highest + 1)
    }

    /// Prefix used for every number.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Takes the next number, skipping any already in `existing`.
    pub fn allocate(&self, year: i32, existing: &HashSet<String>) -> Result<String> {
        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let sequence = self.next.fetch_add(1, Ordering::SeqCst);
            let candidate = format_invoice_number(&self.prefix, year, sequence);
            if !existing.contains(&candidate) {
                return Ok(candidate);
            }
            debug!("Invoice number {candidate} already taken, retrying");
        }
        Err(Error::DuplicateEntry {
            message: format!(
                "no free invoice number for prefix {} after {MAX_NUMBER_ATTEMPTS} attempts",
                self.prefix
            ),
        })
    }
}

/// Loads every issued number and builds a sequence that continues after them.
pub async fn load_invoice_sequence(
    db: &DatabaseConnection,
    prefix: &str,
) -> Result<InvoiceNumberSequence> {
    let numbers = existing_invoice_numbers(db).await?;
    Ok(InvoiceNumberSequence::after_existing(
        prefix,
        numbers.iter().map(String::as_str),
    ))
}

/// A manually added charge, such as travel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalCharge {
    /// Text printed on the invoice
    pub description: String,
    /// Charge amount
    pub amount: f64,
}

impl AdditionalCharge {
    /// A charge using a billing rule's name and default amount.
    #[must_use]
    pub fn from_billing_rule(rule: &billing_rule::Model) -> Self {
        Self {
            description: rule.name.clone(),
            amount: rule.default_amount,
        }
    }
}

/// What to invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRequest {
    /// Client to bill
    pub client_id: i64,
    /// First day covered (inclusive)
    pub start_date: NaiveDate,
    /// Last day covered (inclusive)
    pub end_date: NaiveDate,
    /// Extra charges appended after the time lines
    pub additional_charges: Vec<AdditionalCharge>,
}

/// One line of an invoice that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemDraft {
    /// Source entry, None for additional charges
    pub time_entry_id: Option<i64>,
    /// Printed text
    pub description: String,
    /// Hours, or 1 for additional charges
    pub quantity: f64,
    /// Unit price
    pub rate: f64,
    /// Line total
    pub amount: f64,
    /// Origin of the line
    pub item_type: LineItemType,
}

/// An invoice that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDraft {
    /// Allocated number
    pub invoice_number: String,
    /// Client being billed
    pub client_id: i64,
    /// First day covered (inclusive)
    pub start_date: NaiveDate,
    /// Last day covered (inclusive)
    pub end_date: NaiveDate,
    /// Sum of line amounts
    pub subtotal: f64,
    /// Amount due, equal to the subtotal
    pub total: f64,
    /// Always `Draft` for a new invoice
    pub status: InvoiceStatus,
    /// Lines, time entries first then additional charges
    pub line_items: Vec<LineItemDraft>,
}

/// A stored invoice with its lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceWithItems {
    /// Invoice header
    pub invoice: invoice::Model,
    /// Lines in insertion order
    pub line_items: Vec<invoice_line_item::Model>,
}

/// Billable entries for `client_id` with activity dates in `[start_date, end_date]`.
#[must_use]
pub fn select_invoice_entries<'a>(
    entries: &'a [time_entry::Model],
    client_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<&'a time_entry::Model> {
    let filter = AdminEntryFilter {
        client_id: Some(client_id),
        billable: Some(true),
        ..AdminEntryFilter::date_range(start_date, end_date)
    };
    entries.iter().filter(|entry| filter.matches(entry)).collect()
}

/// Invoice text for an entry: its memo, or `"Service on {date}"` when the memo is blank.
#[must_use]
pub fn line_item_description(entry: &time_entry::Model) -> String {
    entry
        .memo
        .as_deref()
        .map(str::trim)
        .filter(|memo| !memo.is_empty())
        .map_or_else(
            || format!("Service on {}", entry.activity_date.format("%Y-%m-%d")),
            ToString::to_string,
        )
}

fn validate_request(request: &InvoiceRequest) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if request.end_date < request.start_date {
        errors.add("end_date", "End date must be on or after start date");
    }
    for (index, charge) in request.additional_charges.iter().enumerate() {
        if charge.description.trim().is_empty() {
            errors.add(
                format!("additional_charges[{index}].description"),
                "Description is required",
            );
        }
        if !charge.amount.is_finite() {
            errors.add(
                format!("additional_charges[{index}].amount"),
                "Amount must be a valid number",
            );
        }
    }
    errors.into_result()
}

/// Builds an invoice from `entries` without touching the database.
///
/// Entries are selected by client, billable flag and inclusive date range; each
/// becomes a line carrying the entry's stored amount. Additional charges follow as
/// quantity-1 lines. The number is allocated from `sequence` for the year of
/// `issue_date`, skipping anything in `existing_numbers`.
///
/// A request that selects no entries and carries no charges is rejected with a
/// validation error on `entries` rather than producing an empty invoice.
pub fn build_invoice(
    request: &InvoiceRequest,
    entries: &[time_entry::Model],
    sequence: &InvoiceNumberSequence,
    existing_numbers: &HashSet<String>,
    issue_date: NaiveDate,
) -> Result<InvoiceDraft> {
    validate_request(request)?;
    draft_invoice(request, entries, sequence, existing_numbers, issue_date)
}

/// [`build_invoice`] for a request that already passed `validate_request`.
fn draft_invoice(
    request: &InvoiceRequest,
    entries: &[time_entry::Model],
    sequence: &InvoiceNumberSequence,
    existing_numbers: &HashSet<String>,
    issue_date: NaiveDate,
) -> Result<InvoiceDraft> {
    let mut line_items: Vec<LineItemDraft> =
        select_invoice_entries(entries, request.client_id, request.start_date, request.end_date)
            .into_iter()
            .map(|entry| LineItemDraft {
                time_entry_id: Some(entry.id),
                description: line_item_description(entry),
                quantity: entry.duration,
                rate: entry.rate,
                amount: entry.amount,
                item_type: LineItemType::TimeEntry,
            })
            .collect();

    line_items.extend(request.additional_charges.iter().map(|charge| LineItemDraft {
        time_entry_id: None,
        description: charge.description.trim().to_string(),
        quantity: 1.0,
        rate: charge.amount,
        amount: charge.amount,
        item_type: LineItemType::AdditionalCharge,
    }));

    if line_items.is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "entries",
            "No billable time entries or charges for this client and period",
        );
        return Err(Error::Validation(errors));
    }

    let subtotal = round_to_cents(line_items.iter().map(|item| item.amount).sum());
    let invoice_number = sequence.allocate(issue_date.year(), existing_numbers)?;

    Ok(InvoiceDraft {
        invoice_number,
        client_id: request.client_id,
        start_date: request.start_date,
        end_date: request.end_date,
        subtotal,
        total: subtotal,
        status: InvoiceStatus::Draft,
        line_items,
    })
}

/// Every invoice number issued so far.
pub async fn existing_invoice_numbers<C>(db: &C) -> Result<HashSet<String>>
where
    C: ConnectionTrait,
{
    let numbers: Vec<String> = Invoice::find()
        .select_only()
        .column(invoice::Column::InvoiceNumber)
        .into_tuple()
        .all(db)
        .await?;
    Ok(numbers.into_iter().collect())
}

/// Generates, stores, and audits an invoice on behalf of an administrator.
#[instrument(skip(db, sequence, request), fields(client_id = request.client_id))]
pub async fn generate_invoice(
    db: &DatabaseConnection,
    sequence: &InvoiceNumberSequence,
    actor_id: i64,
    request: InvoiceRequest,
    now: DateTime<Utc>,
) -> Result<InvoiceWithItems> {
    // Request-level checks run before the transaction opens
    validate_request(&request)?;

    let txn = db.begin().await?;

    Client::find_by_id(request.client_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Client", request.client_id))?;

    let filter = AdminEntryFilter {
        client_id: Some(request.client_id),
        billable: Some(true),
        ..AdminEntryFilter::date_range(request.start_date, request.end_date)
    };
    let entries = list_time_entries(&txn, &filter).await?;
    let existing = existing_invoice_numbers(&txn).await?;
    let draft = draft_invoice(&request, &entries, sequence, &existing, now.date_naive())?;

    let header = invoice::ActiveModel {
        invoice_number: Set(draft.invoice_number.clone()),
        client_id: Set(draft.client_id),
        start_date: Set(draft.start_date),
        end_date: Set(draft.end_date),
        subtotal: Set(draft.subtotal),
        total: Set(draft.total),
        status: Set(draft.status),
        created_by: Set(actor_id),
        created_at: Set(now),
        ..Default::default()
    };
    let stored = header.insert(&txn).await?;

    let mut line_items = Vec::with_capacity(draft.line_items.len());
    for line in draft.line_items {
        let item = invoice_line_item::ActiveModel {
            invoice_id: Set(stored.id),
            time_entry_id: Set(line.time_entry_id),
            description: Set(line.description),
            quantity: Set(line.quantity),
            rate: Set(line.rate),
            amount: Set(line.amount),
            item_type: Set(line.item_type),
            ..Default::default()
        };
        line_items.push(item.insert(&txn).await?);
    }

    record_audit(
        &txn,
        AuditInput::created(actor_id, ENTITY_TYPE, stored.id, &stored)?,
        now,
    )
    .await?;

    txn.commit().await?;
    info!(
        "Invoice {} generated for client {}: {} lines, total {:.2}",
        stored.invoice_number,
        stored.client_id,
        line_items.len(),
        stored.total
    );

    Ok(InvoiceWithItems {
        invoice: stored,
        line_items,
    })
}

async fn load_line_items<C>(db: &C, invoice_id: i64) -> Result<Vec<invoice_line_item::Model>>
where
    C: ConnectionTrait,
{
    InvoiceLineItem::find()
        .filter(invoice_line_item::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_line_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an invoice with its lines.
pub async fn get_invoice_with_items(
    db: &DatabaseConnection,
    invoice_id: i64,
) -> Result<Option<InvoiceWithItems>> {
    let Some(invoice) = Invoice::find_by_id(invoice_id).one(db).await? else {
        return Ok(None);
    };
    let line_items = load_line_items(db, invoice_id).await?;
    Ok(Some(InvoiceWithItems {
        invoice,
        line_items,
    }))
}

/// Lists a client's invoices, newest first.
pub async fn list_invoices_for_client(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Vec<invoice::Model>> {
    Invoice::find()
        .filter(invoice::Column::ClientId.eq(client_id))
        .order_by_desc(invoice::Column::CreatedAt)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

const fn status_rank(status: InvoiceStatus) -> u8 {
    match status {
        InvoiceStatus::Draft => 0,
        InvoiceStatus::Sent => 1,
        InvoiceStatus::Paid => 2,
    }
}

/// Moves an invoice forward through `draft → sent → paid`.
///
/// Setting the current status is a no-op; moving backwards is rejected.
#[instrument(skip(db))]
pub async fn update_invoice_status(
    db: &DatabaseConnection,
    actor_id: i64,
    invoice_id: i64,
    status: InvoiceStatus,
    now: DateTime<Utc>,
) -> Result<invoice::Model> {
    let txn = db.begin().await?;

    let existing = Invoice::find_by_id(invoice_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Invoice", invoice_id))?;

    if existing.status == status {
        return Ok(existing);
    }
    if status_rank(status) < status_rank(existing.status) {
        return Err(Error::InvalidStatusTransition {
            from: existing.status.to_string(),
            to: status.to_string(),
        });
    }

    let mut active: invoice::ActiveModel = existing.clone().into();
    active.status = Set(status);
    let updated = active.update(&txn).await?;

    record_audit(
        &txn,
        AuditInput::updated(actor_id, ENTITY_TYPE, invoice_id, &existing, &updated)?,
        now,
    )
    .await?;

    txn.commit().await?;
    info!("Invoice {} marked {status}", updated.invoice_number);
    Ok(updated)
}

/// Deletes an invoice together with its lines and returns what was removed.
#[instrument(skip(db))]
pub async fn delete_invoice(
    db: &DatabaseConnection,
    actor_id: i64,
    invoice_id: i64,
    now: DateTime<Utc>,
) -> Result<InvoiceWithItems> {
    let txn = db.begin().await?;

    let invoice = Invoice::find_by_id(invoice_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Invoice", invoice_id))?;
    let line_items = load_line_items(&txn, invoice_id).await?;

    InvoiceLineItem::delete_many()
        .filter(invoice_line_item::Column::InvoiceId.eq(invoice_id))
        .exec(&txn)
        .await?;
    Invoice::delete_by_id(invoice_id).exec(&txn).await?;

    record_audit(
        &txn,
        AuditInput::deleted(actor_id, ENTITY_TYPE, invoice_id, &invoice)?,
        now,
    )
    .await?;

    txn.commit().await?;
    info!("Invoice {} deleted", invoice.invoice_number);
    Ok(InvoiceWithItems {
        invoice,
        line_items,
    })
}

/// Everything an external renderer needs to lay out an invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDocument {
    /// Invoice header and lines
    pub invoice: InvoiceWithItems,
    /// Client name
    pub client_name: String,
    /// Client postal address
    pub client_address: String,
    /// Issuing company name
    pub company_name: String,
    /// Issuing company postal address
    pub company_address: String,
}

/// Turns an [`InvoiceDocument`] into a binary document such as a PDF.
pub trait InvoiceRenderer {
    /// Renders the document.
    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>>;
}

/// Assembles the renderer input for a stored invoice.
pub async fn build_invoice_document(
    db: &DatabaseConnection,
    invoice_id: i64,
    company: &CompanySettings,
) -> Result<InvoiceDocument> {
    let invoice = get_invoice_with_items(db, invoice_id)
        .await?
        .ok_or_else(|| Error::not_found("Invoice", invoice_id))?;
    let client: client::Model = Client::find_by_id(invoice.invoice.client_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Client", invoice.invoice.client_id))?;

    Ok(InvoiceDocument {
        invoice,
        client_name: client.name,
        client_address: client.address.unwrap_or_default(),
        company_name: company.name.clone(),
        company_address: company.address.clone(),
    })
}

/// Builds the document for `invoice_id` and hands it to `renderer`.
pub async fn render_invoice<R>(
    db: &DatabaseConnection,
    renderer: &R,
    invoice_id: i64,
    company: &CompanySettings,
) -> Result<Vec<u8>>
where
    R: InvoiceRenderer + Sync,
{
    let document = build_invoice_document(db, invoice_id, company).await?;
    renderer.render(&document)
}
