//! User Model

use crate::utils::time::{now_millis, snowflake_id};
use serde::{Deserialize, Serialize};

/// Customer record, created lazily on first contact and never deleted.
/// `chat_id` is the external chat identity and is immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: i64,
}

impl User {
    pub fn new(profile: UserCreate) -> Self {
        Self {
            id: snowflake_id(),
            chat_id: profile.chat_id,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            phone: None,
            address: None,
            created_at: now_millis(),
        }
    }
}

/// Profile captured from the chat transport on first contact.
/// Phone and address arrive later through an explicit profile update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub chat_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}
