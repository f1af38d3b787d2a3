use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use settleup_shared::dto::UserResponse;

/// User entity - the signed-in account as cached on the device.
///
/// Serialized with the same field names the API uses, so a cached record and
/// a server record are interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "isEmailVerified", default)]
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Older API versions omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Up to two upper-case initials taken from the first two words of the
    /// name. Falls back to `U` when the name is blank.
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .take(2)
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect();

        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

impl From<UserResponse> for User {
    fn from(user: UserResponse) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            email_verified: user.is_email_verified,
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}
