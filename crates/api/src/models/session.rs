//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, UserId, UserRole};

use crate::error::AppError;

/// Session-stored user identity.
///
/// This is also the `user` object returned by login and `check-auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub user_name: String,
    pub email: Email,
    pub role: UserRole,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Allow access to data owned by `owner` only for that user or an admin.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the caller is neither.
    pub fn ensure_can_access(&self, owner: UserId) -> Result<(), AppError> {
        if self.id == owner || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You can only access your own data".to_owned(),
            ))
        }
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(id: i32, role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            user_name: "shopper".to_owned(),
            email: Email::parse("shopper@example.com").unwrap(),
            role,
        }
    }

    #[test]
    fn test_owner_can_access_own_data() {
        assert!(user(1, UserRole::User).ensure_can_access(UserId::new(1)).is_ok());
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let result = user(1, UserRole::User).ensure_can_access(UserId::new(2));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_admin_can_access_any_user() {
        assert!(user(1, UserRole::Admin).ensure_can_access(UserId::new(2)).is_ok());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(user(3, UserRole::Admin)).unwrap();
        assert_eq!(json["userName"], "shopper");
        assert_eq!(json["role"], "admin");
        assert_eq!(json["id"], 3);
    }
}
