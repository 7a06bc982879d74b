use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_ambulance(conn: &Connection, ambulance: &Ambulance) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO ambulances (id, ambulance_number, device_token, assigned_nurse)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            ambulance.id.to_string(),
            ambulance.ambulance_number,
            ambulance.device_token,
            ambulance.assigned_nurse.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

/// Store a new device token for the ambulance. Returns `false` if the row
/// is gone.
pub fn set_device_token(
    conn: &Connection,
    ambulance_id: &Uuid,
    token: &str,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE ambulances SET device_token = ?1 WHERE id = ?2",
        params![token, ambulance_id.to_string()],
    )?;
    Ok(changed == 1)
}

pub fn get_ambulance_by_token(
    conn: &Connection,
    token: &str,
) -> Result<Option<Ambulance>, DatabaseError> {
    query_one(
        conn,
        "SELECT id, ambulance_number, device_token, assigned_nurse
         FROM ambulances WHERE device_token = ?1",
        token,
    )
}

pub fn get_ambulance_by_number(
    conn: &Connection,
    ambulance_number: &str,
) -> Result<Option<Ambulance>, DatabaseError> {
    query_one(
        conn,
        "SELECT id, ambulance_number, device_token, assigned_nurse
         FROM ambulances WHERE ambulance_number = ?1",
        ambulance_number,
    )
}

fn query_one(
    conn: &Connection,
    sql: &str,
    key: &str,
) -> Result<Option<Ambulance>, DatabaseError> {
    let row = conn
        .query_row(sql, params![key], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })
        .optional()?;

    match row {
        None => Ok(None),
        Some((id, ambulance_number, device_token, assigned_nurse)) => Ok(Some(Ambulance {
            id: parse_uuid(&id)?,
            ambulance_number,
            device_token,
            assigned_nurse: parse_optional_uuid(assigned_nurse)?,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn add_ambulance(conn: &Connection, number: &str) -> Uuid {
        let id = Uuid::new_v4();
        insert_ambulance(
            conn,
            &Ambulance {
                id,
                ambulance_number: number.into(),
                device_token: None,
                assigned_nurse: None,
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn token_lookup_after_set() {
        let conn = open_memory_database().unwrap();
        let id = add_ambulance(&conn, "AMB-7");
        assert!(set_device_token(&conn, &id, "tok").unwrap());

        let found = get_ambulance_by_token(&conn, "tok").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.ambulance_number, "AMB-7");
    }

    #[test]
    fn unknown_id_sets_nothing() {
        let conn = open_memory_database().unwrap();
        add_ambulance(&conn, "AMB-7");
        assert!(!set_device_token(&conn, &Uuid::new_v4(), "tok").unwrap());
        assert!(get_ambulance_by_token(&conn, "tok").unwrap().is_none());
    }

    #[test]
    fn lookup_by_number() {
        let conn = open_memory_database().unwrap();
        add_ambulance(&conn, "AMB-1");
        assert!(get_ambulance_by_number(&conn, "AMB-1").unwrap().is_some());
        assert!(get_ambulance_by_number(&conn, "AMB-2").unwrap().is_none());
    }
}
