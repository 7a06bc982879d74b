//! Hospital and doctor dashboard operations.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{Doctor, Emergency};

/// All emergencies newest first, or only those of `doctor_id`.
pub fn list_emergencies(
    conn: &Connection,
    doctor_id: Option<&Uuid>,
) -> Result<Vec<Emergency>, DatabaseError> {
    match doctor_id {
        Some(id) => db::list_emergencies_for_doctor(conn, id),
        None => db::list_emergencies(conn),
    }
}

/// Every doctor with the online flag, whatever their status.
pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    db::get_all_doctors(conn)
}

/// Staff override. Unlike routing, this replaces any existing doctor.
pub fn manual_assign(
    conn: &Connection,
    emergency_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<Emergency, DatabaseError> {
    if db::get_doctor(conn, doctor_id)?.is_none() {
        return Err(not_found("doctor", doctor_id));
    }
    if !db::override_doctor_assignment(conn, emergency_id, doctor_id)? {
        return Err(not_found("emergency", emergency_id));
    }

    tracing::info!(%emergency_id, %doctor_id, "Doctor assigned manually");
    db::get_emergency(conn, emergency_id)?.ok_or_else(|| not_found("emergency", emergency_id))
}

/// Toggle a doctor's availability. Unknown doctor → not found.
pub fn set_availability(
    conn: &Connection,
    doctor_id: &Uuid,
    online: bool,
) -> Result<Doctor, DatabaseError> {
    if db::get_doctor(conn, doctor_id)?.is_none() {
        return Err(not_found("doctor", doctor_id));
    }
    db::set_doctor_online(conn, doctor_id, online)?;
    tracing::info!(%doctor_id, online, "Doctor availability updated");
    db::get_doctor(conn, doctor_id)?.ok_or_else(|| not_found("doctor", doctor_id))
}

fn not_found(entity_type: &str, id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: entity_type.into(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_emergency, insert_user, open_memory_database};
    use crate::models::{EmergencyStatus, NewEmergency, TriageLevel, UserRole, UserStatus};

    fn new_emergency(symptoms: &str) -> NewEmergency {
        NewEmergency {
            ambulance_id: None,
            nurse_id: None,
            patient_name: None,
            patient_age: None,
            gender: None,
            symptoms: Some(symptoms.into()),
            ai_summary: None,
            doctor_specialty: None,
            triage_level: TriageLevel::Low,
        }
    }

    fn doctor(conn: &Connection, name: &str, status: UserStatus) -> Uuid {
        let id = Uuid::new_v4();
        insert_user(conn, &id, name, UserRole::Doctor, Some("General"), status).unwrap();
        id
    }

    #[test]
    fn manual_assign_overrides_existing_doctor() {
        let conn = open_memory_database().unwrap();
        let first = doctor(&conn, "Dr. One", UserStatus::Active);
        let second = doctor(&conn, "Dr. Two", UserStatus::Inactive);
        let e = insert_emergency(&conn, &new_emergency("cough")).unwrap();

        manual_assign(&conn, &e.id, &first).unwrap();
        let updated = manual_assign(&conn, &e.id, &second).unwrap();
        assert_eq!(updated.doctor_id, Some(second));
        assert_eq!(updated.status, EmergencyStatus::Assigned);
    }

    #[test]
    fn manual_assign_unknown_ids_are_not_found() {
        let conn = open_memory_database().unwrap();
        let d = doctor(&conn, "Dr. One", UserStatus::Active);
        let e = insert_emergency(&conn, &new_emergency("cough")).unwrap();

        let err = manual_assign(&conn, &Uuid::new_v4(), &d).unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotFound { ref entity_type, .. } if entity_type == "emergency"
        ));

        let err = manual_assign(&conn, &e.id, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::NotFound { ref entity_type, .. } if entity_type == "doctor"
        ));
    }

    #[test]
    fn nurse_cannot_be_assigned() {
        let conn = open_memory_database().unwrap();
        let nurse = Uuid::new_v4();
        insert_user(&conn, &nurse, "Nurse", UserRole::Nurse, None, UserStatus::Active).unwrap();
        let e = insert_emergency(&conn, &new_emergency("cough")).unwrap();
        assert!(manual_assign(&conn, &e.id, &nurse).is_err());
    }

    #[test]
    fn doctor_filter_limits_listing() {
        let conn = open_memory_database().unwrap();
        let d = doctor(&conn, "Dr. One", UserStatus::Active);
        let mine = insert_emergency(&conn, &new_emergency("a")).unwrap();
        insert_emergency(&conn, &new_emergency("b")).unwrap();
        manual_assign(&conn, &mine.id, &d).unwrap();

        assert_eq!(list_emergencies(&conn, None).unwrap().len(), 2);
        let only = list_emergencies(&conn, Some(&d)).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, mine.id);
    }

    #[test]
    fn availability_toggle_is_visible_in_listing() {
        let conn = open_memory_database().unwrap();
        let d = doctor(&conn, "Dr. One", UserStatus::Active);
        assert!(!list_doctors(&conn).unwrap()[0].is_online);

        assert!(set_availability(&conn, &d, true).unwrap().is_online);
        assert!(list_doctors(&conn).unwrap()[0].is_online);
        assert!(!set_availability(&conn, &d, false).unwrap().is_online);

        assert!(set_availability(&conn, &Uuid::new_v4(), true).is_err());
    }
}
