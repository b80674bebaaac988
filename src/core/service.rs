//! Service business logic - Maintains the catalog of billable services.

use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

use crate::{
    entities::{Service, service},
    errors::{Error, Result, ValidationErrors},
};

/// Retrieves all active services, ordered alphabetically by name.
pub async fn get_all_active_services(db: &DatabaseConnection) -> Result<Vec<service::Model>> {
    Service::find()
        .filter(service::Column::IsActive.eq(true))
        .order_by_asc(service::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a service by its exact name, active or not.
pub async fn get_service_by_name<C>(db: &C, name: &str) -> Result<Option<service::Model>>
where
    C: ConnectionTrait,
{
    Service::find()
        .filter(service::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new active service.
///
/// # Errors
/// Returns a validation error for a blank name and [`Error::DuplicateEntry`] if a
/// service with the same name exists.
pub async fn create_service(
    db: &DatabaseConnection,
    name: &str,
    description: Option<String>,
) -> Result<service::Model> {
    let name = name.trim();
    if name.is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Service name is required");
        return Err(Error::Validation(errors));
    }

    if get_service_by_name(db, name).await?.is_some() {
        return Err(Error::DuplicateEntry {
            message: format!("Service '{name}' already exists"),
        });
    }

    let service = service::ActiveModel {
        name: Set(name.to_string()),
        description: Set(description),
        is_active: Set(true),
        ..Default::default()
    };
    let created = service.insert(db).await?;
    info!("Service '{}' created with id {}", created.name, created.id);
    Ok(created)
}

/// Activates or deactivates a service.
pub async fn set_service_active(
    db: &DatabaseConnection,
    service_id: i64,
    is_active: bool,
) -> Result<service::Model> {
    let mut service: service::ActiveModel = Service::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Service", service_id))?
        .into();

    service.is_active = Set(is_active);
    service.update(db).await.map_err(Into::into)
}
