use rusqlite::Connection;
use uuid::Uuid;

use super::types::{Candidate, RoutingJustification};
use crate::db::{self, DatabaseError};
use crate::models::Emergency;

/// Persistence seam for the router.
pub trait RecordStore {
    fn fetch_emergency(&self, id: &Uuid) -> Result<Option<Emergency>, DatabaseError>;

    /// Active doctors with availability, in stable store order.
    fn fetch_active_candidates(&self) -> Result<Vec<Candidate>, DatabaseError>;

    /// Record the doctor only if the emergency is still unassigned.
    /// Returns whether the write happened.
    fn assign_emergency(
        &self,
        emergency_id: &Uuid,
        doctor_id: &Uuid,
        justification: &RoutingJustification,
    ) -> Result<bool, DatabaseError>;

    /// Ids of emergencies without a doctor, oldest first.
    fn list_unassigned(&self) -> Result<Vec<Uuid>, DatabaseError>;
}

/// `RecordStore` over a borrowed SQLite connection.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteStore<'_> {
    fn fetch_emergency(&self, id: &Uuid) -> Result<Option<Emergency>, DatabaseError> {
        db::get_emergency(self.conn, id)
    }

    fn fetch_active_candidates(&self) -> Result<Vec<Candidate>, DatabaseError> {
        Ok(db::get_active_doctors(self.conn)?
            .into_iter()
            .map(Candidate::from)
            .collect())
    }

    fn assign_emergency(
        &self,
        emergency_id: &Uuid,
        doctor_id: &Uuid,
        justification: &RoutingJustification,
    ) -> Result<bool, DatabaseError> {
        let record = serde_json::to_value(justification)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
        db::assign_doctor_if_unassigned(self.conn, emergency_id, doctor_id, &record)
    }

    fn list_unassigned(&self) -> Result<Vec<Uuid>, DatabaseError> {
        Ok(db::list_unassigned_emergencies(self.conn)?
            .into_iter()
            .map(|e| e.id)
            .collect())
    }
}
