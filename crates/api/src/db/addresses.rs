//! Saved address repository.
//!
//! Every lookup is scoped by `user_id`, so an address belonging to another
//! user behaves exactly like a missing one.

use sqlx::PgPool;

use bazaar_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::address::{Address, AddressUpdate, NewAddress};

const ADDRESS_COLUMNS: &str =
    "id, user_id, address, city, pincode, phone, notes, created_at, updated_at";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Save a new address for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        address: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, Address>(&format!(
            r"
            INSERT INTO shop.address (user_id, address, city, pincode, phone, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(address.address.trim())
        .bind(address.city.trim())
        .bind(address.pincode.trim())
        .bind(address.phone.trim())
        .bind(&address.notes)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// List a user's addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shop.address WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shop.address WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Apply a partial update to one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist for this user.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        update: &AddressUpdate,
    ) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>(&format!(
            r"
            UPDATE shop.address SET
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                pincode = COALESCE($5, pincode),
                phone = COALESCE($6, phone),
                notes = COALESCE($7, notes)
            WHERE id = $1 AND user_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user_id)
        .bind(update.address.as_deref().map(str::trim))
        .bind(update.city.as_deref().map(str::trim))
        .bind(update.pincode.as_deref().map(str::trim))
        .bind(update.phone.as_deref().map(str::trim))
        .bind(&update.notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist for this user.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.address WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
