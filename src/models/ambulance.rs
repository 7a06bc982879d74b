use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ambulance {
    pub id: Uuid,
    pub ambulance_number: String,
    #[serde(skip_serializing)]
    pub device_token: Option<String>,
    pub assigned_nurse: Option<Uuid>,
}
