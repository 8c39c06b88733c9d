//! Identity Service - Chat-identity resolution
//!
//! Every inbound interaction starts with [`IdentityService::ensure_user`]:
//! the first contact from a chat id creates a record, every later contact
//! returns the existing one untouched. Profile changes only happen through
//! the explicit [`IdentityService::update_user`] path.

use crate::db::ShopStorage;
use crate::db::models::{User, UserCreate, UserUpdate};
use crate::utils::validation::{self, MAX_ADDRESS_LEN, MAX_CONTACT_TEXT_LEN};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct IdentityService {
    storage: ShopStorage,
}

impl IdentityService {
    pub fn new(storage: ShopStorage) -> Self {
        Self { storage }
    }

    /// Create-or-fetch by chat id.
    ///
    /// The profile fields in `request` are only used when the chat id is
    /// new; a repeat contact never overwrites what is already stored, even
    /// if the chat platform reports a changed username.
    pub fn ensure_user(&self, request: UserCreate) -> AppResult<User> {
        let chat_id = request.chat_id;
        let (user, created) = self.storage.create_user_if_absent(User::new(request))?;
        if created {
            tracing::info!(user_id = user.id, chat_id, "User registered");
        }
        Ok(user)
    }

    /// Apply a partial profile update (phone, address, names).
    pub fn update_user(&self, user_id: i64, update: UserUpdate) -> AppResult<User> {
        validation::validate_optional_text(&update.phone, "Phone", MAX_CONTACT_TEXT_LEN)?;
        validation::validate_optional_text(&update.address, "Address", MAX_ADDRESS_LEN)?;
        self.storage
            .update_user(user_id, &update)?
            .ok_or_else(|| AppError::not_found(format!("User not found: {user_id}")))
    }

    pub fn get_user(&self, user_id: i64) -> AppResult<User> {
        self.storage
            .get_user(user_id)?
            .ok_or_else(|| AppError::not_found(format!("User not found: {user_id}")))
    }

    pub fn get_user_by_chat(&self, chat_id: i64) -> AppResult<Option<User>> {
        Ok(self.storage.get_user_by_chat(chat_id)?)
    }
}
