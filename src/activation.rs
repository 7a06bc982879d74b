//! Ambulance device activation.
//!
//! A tablet is bound to an ambulance by exchanging the ambulance number for
//! an opaque device token. Each activation replaces the previous token, so
//! only the most recently activated device can submit intake reports.

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};

#[derive(Error, Debug)]
pub enum ActivationError {
    #[error("Ambulance number is required")]
    InvalidInput,

    #[error("Unknown ambulance: {0}")]
    UnknownAmbulance(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Issue a fresh device token for `ambulance_number`.
pub fn activate_device(
    conn: &Connection,
    ambulance_number: &str,
) -> Result<String, ActivationError> {
    let number = ambulance_number.trim();
    if number.is_empty() {
        return Err(ActivationError::InvalidInput);
    }

    let unknown = || {
        tracing::warn!(ambulance_number = number, "Activation for unknown ambulance");
        ActivationError::UnknownAmbulance(number.to_string())
    };
    let ambulance = db::get_ambulance_by_number(conn, number)?.ok_or_else(unknown)?;

    let token = generate_device_token();
    if !db::set_device_token(conn, &ambulance.id, &token)? {
        return Err(unknown());
    }

    tracing::info!(
        ambulance_id = %ambulance.id,
        ambulance_number = number,
        replaced = ambulance.device_token.is_some(),
        "Ambulance device activated"
    );
    Ok(token)
}

/// 32 lowercase hex characters.
fn generate_device_token() -> String {
    Uuid::new_v4().simple().to_string()
}
