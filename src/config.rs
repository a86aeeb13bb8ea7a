use std::path::PathBuf;

use teloxide::types::ChatId;

use crate::BotError;

/// Startup configuration. There are no built-in fallbacks for the admin
/// identity; a missing `ADMIN_ID` is a startup error, not a default.
#[derive(Debug, Clone)]
pub struct BotConfig {
    admin_id: String,
    pub data_dir: PathBuf,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, BotError> {
        let admin_id = std::env::var("ADMIN_ID").map_err(|_| "ADMIN_ID should be set.")?;
        if admin_id.trim().is_empty() {
            return Err("ADMIN_ID should not be empty.".into());
        }
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into());

        Ok(Self {
            admin_id: admin_id.trim().to_owned(),
            data_dir: data_dir.into(),
        })
    }

    /// The entire authorization model: an exact string comparison against
    /// the configured identifier.
    pub(crate) fn is_admin(&self, chat: ChatId) -> bool {
        chat.0.to_string() == self.admin_id
    }
}
