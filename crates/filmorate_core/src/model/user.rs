//! User domain model.

use super::UNASSIGNED_ID;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// Catalog user.
///
/// `email` and `login` are unique across all users; both repository
/// backends enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned id. `0` on create requests.
    #[serde(default)]
    pub id: UserId,
    pub email: String,
    pub login: String,
    /// Display name. Blank on create means "use the login".
    #[serde(default)]
    pub name: String,
    pub birthday: NaiveDate,
}

impl User {
    /// Builds a create request (no id yet).
    pub fn new(
        email: impl Into<String>,
        login: impl Into<String>,
        name: impl Into<String>,
        birthday: NaiveDate,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            email: email.into(),
            login: login.into(),
            name: name.into(),
            birthday,
        }
    }

    /// Returns whether a store already assigned this user an id.
    pub fn has_id(&self) -> bool {
        self.id != UNASSIGNED_ID
    }

    /// Falls back to `login` when the display name is blank.
    pub fn default_name_to_login(&mut self) {
        if self.name.trim().is_empty() {
            self.name = self.login.clone();
        }
    }
}
