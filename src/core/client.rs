//! Client business logic - Maintains the directory of billed clients.
//!
//! Clients are deactivated rather than deleted so that time entries and invoices
//! keep resolving their client.

use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

use crate::{
    entities::{Client, client},
    errors::{Error, Result, ValidationErrors},
};

/// Retrieves all active clients, ordered alphabetically by name.
pub async fn get_all_active_clients(db: &DatabaseConnection) -> Result<Vec<client::Model>> {
    Client::find()
        .filter(client::Column::IsActive.eq(true))
        .order_by_asc(client::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific client by its unique ID, active or not.
pub async fn get_client_by_id(
    db: &DatabaseConnection,
    client_id: i64,
) -> Result<Option<client::Model>> {
    Client::find_by_id(client_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new active client.
///
/// # Errors
/// Returns a validation error if the name is empty or whitespace-only.
pub async fn create_client(
    db: &DatabaseConnection,
    name: &str,
    email: Option<String>,
    address: Option<String>,
) -> Result<client::Model> {
    let name = name.trim();
    if name.is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Client name is required");
        return Err(Error::Validation(errors));
    }

    let client = client::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.filter(|email| !email.trim().is_empty())),
        address: Set(address.filter(|address| !address.trim().is_empty())),
        is_active: Set(true),
        ..Default::default()
    };
    let created = client.insert(db).await?;
    info!("Client '{}' created with id {}", created.name, created.id);
    Ok(created)
}

/// Activates or deactivates a client.
///
/// # Errors
/// Returns [`Error::NotFound`] if the client does not exist.
pub async fn set_client_active(
    db: &DatabaseConnection,
    client_id: i64,
    is_active: bool,
) -> Result<client::Model> {
    let mut client: client::ActiveModel = Client::find_by_id(client_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Client", client_id))?
        .into();

    client.is_active = Set(is_active);
    client.update(db).await.map_err(Into::into)
}
