use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{NewPatient, Patient};

pub fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<Patient, DatabaseError> {
    conn.execute(
        "INSERT INTO Patients (Patient_Name, Patient_Records, Phone_Num, Email, Doc_ID, Staff_ID)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.name,
            patient.records,
            patient.phone,
            patient.email,
            patient.doctor_id,
            patient.staff_id,
        ],
    )?;
    get_patient(conn, conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Patient, DatabaseError> {
    conn.query_row(
        "SELECT Patient_ID, Patient_Name, Patient_Records, Phone_Num, Email, Doc_ID, Staff_ID
         FROM Patients WHERE Patient_ID = ?1",
        params![id],
        patient_from_row,
    )
    .optional()?
    .ok_or(DatabaseError::NotFound { entity: "patient", id })
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Patient_ID, Patient_Name, Patient_Records, Phone_Num, Email, Doc_ID, Staff_ID
         FROM Patients ORDER BY Patient_ID",
    )?;
    let rows = stmt.query_map([], patient_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn list_patients_of_doctor(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Patient_ID, Patient_Name, Patient_Records, Phone_Num, Email, Doc_ID, Staff_ID
         FROM Patients WHERE Doc_ID = ?1 ORDER BY Patient_ID",
    )?;
    let rows = stmt.query_map(params![doctor_id], patient_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_patient(
    conn: &Connection,
    id: i64,
    patient: &NewPatient,
) -> Result<Patient, DatabaseError> {
    let changed = conn.execute(
        "UPDATE Patients SET Patient_Name = ?1, Patient_Records = ?2, Phone_Num = ?3,
         Email = ?4, Doc_ID = ?5, Staff_ID = ?6
         WHERE Patient_ID = ?7",
        params![
            patient.name,
            patient.records,
            patient.phone,
            patient.email,
            patient.doctor_id,
            patient.staff_id,
            id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "patient", id });
    }
    get_patient(conn, id)
}

pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM Patients WHERE Patient_ID = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "patient", id });
    }
    Ok(())
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> Result<Patient, rusqlite::Error> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        records: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        doctor_id: row.get(5)?,
        staff_id: row.get(6)?,
    })
}
