//! Saved delivery addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{AddressId, UserId};

use crate::error::AppError;

const MISSING_FIELDS: &str = "Missing required address fields!";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub phone: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for adding an address.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub phone: String,
    pub notes: Option<String>,
}

impl NewAddress {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when a required field is blank.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [&self.address, &self.city, &self.pincode, &self.phone];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AppError::BadRequest(MISSING_FIELDS.to_owned()));
        }
        Ok(())
    }
}

/// Request body for editing an address. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUpdate {
    pub address: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl AddressUpdate {
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when a required field is present but blank.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [&self.address, &self.city, &self.pincode, &self.phone];
        if required
            .iter()
            .any(|field| field.as_ref().is_some_and(|v| v.trim().is_empty()))
        {
            return Err(AppError::BadRequest(MISSING_FIELDS.to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewAddress {
        NewAddress {
            address: "12 Market Street".to_owned(),
            city: "Springfield".to_owned(),
            pincode: "40001".to_owned(),
            phone: "555-0100".to_owned(),
            notes: None,
        }
    }

    #[test]
    fn test_new_address_valid_without_notes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_new_address_requires_every_field() {
        let mut address = valid();
        address.phone = "   ".to_owned();
        assert!(matches!(address.validate(), Err(AppError::BadRequest(m)) if m == MISSING_FIELDS));
    }

    #[test]
    fn test_update_rejects_blank_present_field() {
        assert!(AddressUpdate::default().validate().is_ok());
        let update = AddressUpdate {
            city: Some(String::new()),
            ..AddressUpdate::default()
        };
        assert!(update.validate().is_err());
        let update = AddressUpdate {
            notes: Some(String::new()),
            ..AddressUpdate::default()
        };
        assert!(update.validate().is_ok());
    }
}
