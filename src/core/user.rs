//! User business logic - Account provisioning and lookup.
//!
//! Authentication happens outside this crate; callers pass the authenticated user's
//! id and role into the operations that need them.

use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

use crate::{
    entities::{User, UserRole, user},
    errors::{Error, Result, ValidationErrors},
};

/// Provisions a new user account.
///
/// # Errors
/// Returns a validation error for a blank name or malformed email, and
/// [`Error::DuplicateEntry`] if the email is already registered.
pub async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    role: UserRole,
    now: DateTime<Utc>,
) -> Result<user::Model> {
    let name = name.trim();
    let email = email.trim().to_lowercase();

    let mut errors = ValidationErrors::new();
    if name.is_empty() {
        errors.add("name", "Name is required");
    }
    if !email.contains('@') {
        errors.add("email", "Email address is invalid");
    }
    errors.into_result()?;

    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::DuplicateEntry {
            message: format!("A user with email {email} already exists"),
        });
    }

    let user = user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email),
        role: Set(role),
        created_at: Set(now),
        ..Default::default()
    };
    let created = user.insert(db).await?;
    info!("User {} provisioned as {:?}", created.id, created.role);
    Ok(created)
}

/// Retrieves a user by id.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Retrieves a user by email, compared case-insensitively.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists users ordered by name, optionally restricted to one role.
pub async fn list_users(db: &DatabaseConnection, role: Option<UserRole>) -> Result<Vec<user::Model>> {
    let mut query = User::find().order_by_asc(user::Column::Name);
    if let Some(role) = role {
        query = query.filter(user::Column::Role.eq(role));
    }
    query.all(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{setup_test_db, test_now};

    #[tokio::test]
    async fn test_user_provisioning() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_user(&db, "Ana", "Ana@Firm.test", UserRole::Employee, test_now()).await?;
        create_user(&db, "Boss", "boss@firm.test", UserRole::Administrator, test_now()).await?;

        assert_eq!(ana.email, "ana@firm.test");
        assert!(get_user_by_email(&db, "ANA@firm.test").await?.is_some());

        let duplicate = create_user(&db, "Other", "ana@firm.test", UserRole::Employee, test_now()).await;
        assert!(matches!(duplicate, Err(Error::DuplicateEntry { .. })));

        let employees = list_users(&db, Some(UserRole::Employee)).await?;
        assert_eq!(employees.len(), 1);
        assert_eq!(list_users(&db, None).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_validation_collects_all_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let Err(Error::Validation(errors)) =
            create_user(&db, " ", "not-an-email", UserRole::Employee, test_now()).await
        else {
            panic!("expected validation error");
        };
        assert!(errors.field("name").is_some());
        assert!(errors.field("email").is_some());
        Ok(())
    }
}
