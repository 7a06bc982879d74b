use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_timestamp, now_timestamp, parse_optional_uuid, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::*;

const EMERGENCY_COLUMNS: &str = "id, ambulance_id, nurse_id, patient_name, patient_age, gender,
     symptoms, ai_summary, doctor_specialty, triage_level, status, doctor_id,
     ai_routing_agent_output, created_at, updated_at";

pub fn insert_emergency(
    conn: &Connection,
    new: &NewEmergency,
) -> Result<Emergency, DatabaseError> {
    let now = now_timestamp();
    let emergency = Emergency {
        id: Uuid::new_v4(),
        ambulance_id: new.ambulance_id,
        nurse_id: new.nurse_id,
        patient_name: new.patient_name.clone(),
        patient_age: new.patient_age,
        gender: new.gender.clone(),
        symptoms: new.symptoms.clone(),
        ai_summary: new.ai_summary.clone(),
        doctor_specialty: new.doctor_specialty.clone(),
        triage_level: new.triage_level,
        status: EmergencyStatus::Initiated,
        doctor_id: None,
        ai_routing_agent_output: None,
        created_at: now,
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO emergencies (id, ambulance_id, nurse_id, patient_name, patient_age, gender,
         symptoms, ai_summary, doctor_specialty, triage_level, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            emergency.id.to_string(),
            emergency.ambulance_id.map(|id| id.to_string()),
            emergency.nurse_id.map(|id| id.to_string()),
            emergency.patient_name,
            emergency.patient_age,
            emergency.gender,
            emergency.symptoms,
            emergency.ai_summary.as_ref().map(|v| v.to_string()),
            emergency.doctor_specialty,
            emergency.triage_level.as_str(),
            emergency.status.as_str(),
            format_timestamp(&emergency.created_at),
            format_timestamp(&emergency.updated_at),
        ],
    )?;
    Ok(emergency)
}

pub fn get_emergency(conn: &Connection, id: &Uuid) -> Result<Option<Emergency>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {EMERGENCY_COLUMNS} FROM emergencies WHERE id = ?1"),
            params![id.to_string()],
            emergency_row_from_rusqlite,
        )
        .optional()?;

    row.map(emergency_from_row).transpose()
}

/// All emergencies, newest first (hospital dashboard).
pub fn list_emergencies(conn: &Connection) -> Result<Vec<Emergency>, DatabaseError> {
    query_emergencies(
        conn,
        &format!(
            "SELECT {EMERGENCY_COLUMNS} FROM emergencies
             ORDER BY created_at DESC, rowid DESC"
        ),
        params![],
    )
}

/// Emergencies assigned to one doctor, newest first (doctor dashboard).
pub fn list_emergencies_for_doctor(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Vec<Emergency>, DatabaseError> {
    query_emergencies(
        conn,
        &format!(
            "SELECT {EMERGENCY_COLUMNS} FROM emergencies WHERE doctor_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ),
        params![doctor_id.to_string()],
    )
}

/// Emergencies still waiting for a doctor, oldest first.
pub fn list_unassigned_emergencies(conn: &Connection) -> Result<Vec<Emergency>, DatabaseError> {
    query_emergencies(
        conn,
        &format!(
            "SELECT {EMERGENCY_COLUMNS} FROM emergencies WHERE doctor_id IS NULL
             ORDER BY created_at ASC, rowid ASC"
        ),
        params![],
    )
}

/// Conditionally record a routing decision.
///
/// Only writes when the emergency has no doctor yet. Returns `false` when
/// zero rows were affected: either another writer assigned it first or
/// the emergency does not exist.
pub fn assign_doctor_if_unassigned(
    conn: &Connection,
    emergency_id: &Uuid,
    doctor_id: &Uuid,
    justification: &serde_json::Value,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE emergencies
         SET doctor_id = ?1, ai_routing_agent_output = ?2, status = ?3, updated_at = ?4
         WHERE id = ?5 AND doctor_id IS NULL",
        params![
            doctor_id.to_string(),
            justification.to_string(),
            EmergencyStatus::DoctorAssigned.as_str(),
            format_timestamp(&now_timestamp()),
            emergency_id.to_string(),
        ],
    )?;
    Ok(changed == 1)
}

/// Staff override: set the doctor unconditionally. Returns `false` if the
/// emergency does not exist.
pub fn override_doctor_assignment(
    conn: &Connection,
    emergency_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE emergencies SET doctor_id = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            doctor_id.to_string(),
            EmergencyStatus::Assigned.as_str(),
            format_timestamp(&now_timestamp()),
            emergency_id.to_string(),
        ],
    )?;
    Ok(changed == 1)
}

fn query_emergencies<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Emergency>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, emergency_row_from_rusqlite)?;

    let mut emergencies = Vec::new();
    for row in rows {
        emergencies.push(emergency_from_row(row?)?);
    }
    Ok(emergencies)
}

struct EmergencyRow {
    id: String,
    ambulance_id: Option<String>,
    nurse_id: Option<String>,
    patient_name: Option<String>,
    patient_age: Option<i64>,
    gender: Option<String>,
    symptoms: Option<String>,
    ai_summary: Option<String>,
    doctor_specialty: Option<String>,
    triage_level: String,
    status: String,
    doctor_id: Option<String>,
    ai_routing_agent_output: Option<String>,
    created_at: String,
    updated_at: String,
}

fn emergency_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<EmergencyRow, rusqlite::Error> {
    Ok(EmergencyRow {
        id: row.get(0)?,
        ambulance_id: row.get(1)?,
        nurse_id: row.get(2)?,
        patient_name: row.get(3)?,
        patient_age: row.get(4)?,
        gender: row.get(5)?,
        symptoms: row.get(6)?,
        ai_summary: row.get(7)?,
        doctor_specialty: row.get(8)?,
        triage_level: row.get(9)?,
        status: row.get(10)?,
        doctor_id: row.get(11)?,
        ai_routing_agent_output: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn emergency_from_row(row: EmergencyRow) -> Result<Emergency, DatabaseError> {
    Ok(Emergency {
        id: parse_uuid(&row.id)?,
        ambulance_id: parse_optional_uuid(row.ambulance_id)?,
        nurse_id: parse_optional_uuid(row.nurse_id)?,
        patient_name: row.patient_name,
        patient_age: row.patient_age,
        gender: row.gender,
        symptoms: row.symptoms,
        // Unparsable blobs are dropped rather than failing the whole listing.
        ai_summary: row.ai_summary.and_then(|s| serde_json::from_str(&s).ok()),
        doctor_specialty: row.doctor_specialty,
        triage_level: TriageLevel::from_str(&row.triage_level)?,
        status: EmergencyStatus::from_str(&row.status)?,
        doctor_id: parse_optional_uuid(row.doctor_id)?,
        ai_routing_agent_output: row
            .ai_routing_agent_output
            .and_then(|s| serde_json::from_str(&s).ok()),
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    })
}
