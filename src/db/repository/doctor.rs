use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DatabaseError;
use crate::models::*;

const DOCTOR_COLUMNS: &str = "u.id, u.full_name, u.specialization, u.status, a.online_status";

pub fn insert_user(
    conn: &Connection,
    id: &Uuid,
    full_name: &str,
    role: UserRole,
    specialization: Option<&str>,
    status: UserStatus,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, full_name, role, specialization, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.to_string(),
            full_name,
            role.as_str(),
            specialization,
            status.as_str(),
        ],
    )?;
    Ok(())
}

/// Record a doctor's online/offline state (upsert).
pub fn set_doctor_online(
    conn: &Connection,
    doctor_id: &Uuid,
    online: bool,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctor_availability (doctor_id, online_status, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(doctor_id) DO UPDATE SET
            online_status = excluded.online_status,
            updated_at = excluded.updated_at",
        params![doctor_id.to_string(), online as i32],
    )?;
    Ok(())
}

/// Active doctors in registration order. The routing tie-break depends
/// on this order being stable.
pub fn get_active_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    query_doctors(
        conn,
        &format!(
            "SELECT {DOCTOR_COLUMNS}
             FROM users u LEFT JOIN doctor_availability a ON a.doctor_id = u.id
             WHERE u.role = 'doctor' AND u.status = 'active'
             ORDER BY u.rowid"
        ),
    )
}

/// Every doctor regardless of status (hospital dashboard).
pub fn get_all_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    query_doctors(
        conn,
        &format!(
            "SELECT {DOCTOR_COLUMNS}
             FROM users u LEFT JOIN doctor_availability a ON a.doctor_id = u.id
             WHERE u.role = 'doctor'
             ORDER BY u.full_name, u.rowid"
        ),
    )
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {DOCTOR_COLUMNS}
                 FROM users u LEFT JOIN doctor_availability a ON a.doctor_id = u.id
                 WHERE u.role = 'doctor' AND u.id = ?1"
            ),
            params![id.to_string()],
            doctor_row_from_rusqlite,
        )
        .optional()?;

    row.map(doctor_from_row).transpose()
}

fn query_doctors(conn: &Connection, sql: &str) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], doctor_row_from_rusqlite)?;

    let mut doctors = Vec::new();
    for row in rows {
        doctors.push(doctor_from_row(row?)?);
    }
    Ok(doctors)
}

struct DoctorRow {
    id: String,
    full_name: String,
    specialization: Option<String>,
    status: String,
    online_status: Option<i64>,
}

fn doctor_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<DoctorRow, rusqlite::Error> {
    Ok(DoctorRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        specialization: row.get(2)?,
        status: row.get(3)?,
        online_status: row.get(4)?,
    })
}

fn doctor_from_row(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    Ok(Doctor {
        id: parse_uuid(&row.id)?,
        full_name: row.full_name,
        specialization: row.specialization,
        status: UserStatus::from_str(&row.status)?,
        // LEFT JOIN miss → offline
        is_online: row.online_status.unwrap_or(0) != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn add_doctor(conn: &Connection, name: &str, spec: Option<&str>, status: UserStatus) -> Uuid {
        let id = Uuid::new_v4();
        insert_user(conn, &id, name, UserRole::Doctor, spec, status).unwrap();
        id
    }

    #[test]
    fn active_doctors_exclude_inactive_and_other_roles() {
        let conn = open_memory_database().unwrap();
        let active = add_doctor(&conn, "Dr. Rao", Some("Cardiology"), UserStatus::Active);
        add_doctor(&conn, "Dr. Idle", Some("Neurology"), UserStatus::Inactive);
        insert_user(
            &conn,
            &Uuid::new_v4(),
            "Nurse Joy",
            UserRole::Nurse,
            None,
            UserStatus::Active,
        )
        .unwrap();

        let doctors = get_active_doctors(&conn).unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].id, active);
    }

    #[test]
    fn missing_availability_row_means_offline() {
        let conn = open_memory_database().unwrap();
        let a = add_doctor(&conn, "Dr. A", None, UserStatus::Active);
        let b = add_doctor(&conn, "Dr. B", None, UserStatus::Active);
        set_doctor_online(&conn, &b, true).unwrap();

        let doctors = get_active_doctors(&conn).unwrap();
        assert_eq!(doctors[0].id, a);
        assert!(!doctors[0].is_online);
        assert_eq!(doctors[1].id, b);
        assert!(doctors[1].is_online);
    }

    #[test]
    fn availability_upsert_overwrites() {
        let conn = open_memory_database().unwrap();
        let id = add_doctor(&conn, "Dr. C", None, UserStatus::Active);
        set_doctor_online(&conn, &id, true).unwrap();
        set_doctor_online(&conn, &id, false).unwrap();
        assert!(!get_doctor(&conn, &id).unwrap().unwrap().is_online);
    }

    #[test]
    fn active_doctors_keep_registration_order() {
        let conn = open_memory_database().unwrap();
        let ids: Vec<Uuid> = ["Zed", "Amy", "Mo"]
            .iter()
            .map(|n| add_doctor(&conn, n, None, UserStatus::Active))
            .collect();
        let listed: Vec<Uuid> = get_active_doctors(&conn)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn all_doctors_include_inactive() {
        let conn = open_memory_database().unwrap();
        add_doctor(&conn, "Dr. On", None, UserStatus::Active);
        add_doctor(&conn, "Dr. Off", None, UserStatus::Inactive);
        assert_eq!(get_all_doctors(&conn).unwrap().len(), 2);
    }

    #[test]
    fn get_doctor_ignores_non_doctors() {
        let conn = open_memory_database().unwrap();
        let nurse = Uuid::new_v4();
        insert_user(&conn, &nurse, "Nurse", UserRole::Nurse, None, UserStatus::Active).unwrap();
        assert!(get_doctor(&conn, &nurse).unwrap().is_none());
    }
}
