//! Active-context pointer.
//!
//! Each user may designate at most one of their servers as the active
//! context for query routing. The pointer references the server by name;
//! it does not own the configuration.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user pointer to the currently selected server.
///
/// Invariant: `server_name` must reference an enabled server owned by
/// `user_id`. The manager enforces this on selection; removal of the
/// referenced server clears the pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveContext {
    /// Owning user.
    pub user_id: i64,

    /// Name of the selected server (reference, not ownership).
    pub server_name: String,

    /// Free-form per-context settings.
    #[serde(default)]
    pub settings: HashMap<String, String>,

    /// When the selection was made.
    pub selected_at: DateTime<Utc>,
}

impl ActiveContext {
    /// Create a pointer selected now.
    pub fn new(user_id: i64, server_name: impl Into<String>) -> Self {
        Self {
            user_id,
            server_name: server_name.into(),
            settings: HashMap::new(),
            selected_at: Utc::now(),
        }
    }

    /// Add a context setting.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }
}
