use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::UserStatus;

/// A user with the doctor role, as listed on the hospital dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub specialization: Option<String>,
    pub status: UserStatus,
    /// Normalized from the optional availability row; absent means offline.
    pub is_online: bool,
}
