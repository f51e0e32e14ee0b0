use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_datetime, DatabaseError};
use crate::models::{Appointment, AppointmentStatus};

/// Raw insert. Status movement belongs to the lifecycle module; this
/// only exists so `lifecycle::create_appointment` and the seed path
/// share one INSERT.
pub fn insert_appointment(
    conn: &Connection,
    patient_id: Option<i64>,
    doctor_id: i64,
    date: NaiveDateTime,
    status: AppointmentStatus,
    kind: Option<&str>,
    specialty: &str,
    notes: Option<&str>,
) -> Result<Appointment, DatabaseError> {
    conn.execute(
        "INSERT INTO Appointments (Patient_ID, Doc_ID, Appointment_Date, Statusof, Typeof, Speciality, Notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            patient_id,
            doctor_id,
            format_datetime(date),
            status.code(),
            kind,
            specialty,
            notes,
        ],
    )?;
    get_appointment(conn, conn.last_insert_rowid())
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Appointment, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT Appointment_ID, Patient_ID, Doc_ID, Appointment_Date, Statusof, Typeof, Speciality, Notes
             FROM Appointments WHERE Appointment_ID = ?1",
            params![id],
            appointment_row,
        )
        .optional()?;
    match row {
        Some(raw) => appointment_from_row(raw),
        None => Err(DatabaseError::NotFound { entity: "appointment", id }),
    }
}

pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    select_appointments(conn, "ORDER BY Appointment_Date", &[])
}

pub fn list_by_doctor(conn: &Connection, doctor_id: i64) -> Result<Vec<Appointment>, DatabaseError> {
    select_appointments(
        conn,
        "WHERE Doc_ID = ?1 ORDER BY Appointment_Date",
        &[&doctor_id],
    )
}

pub fn list_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<Appointment>, DatabaseError> {
    select_appointments(
        conn,
        "WHERE Patient_ID = ?1 ORDER BY Appointment_Date",
        &[&patient_id],
    )
}

/// Filters on the stored specialty snapshot, not the doctor's current one.
pub fn list_by_specialty(
    conn: &Connection,
    specialty: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    select_appointments(
        conn,
        "WHERE Speciality = ?1 ORDER BY Appointment_Date",
        &[&specialty],
    )
}

pub fn list_in_range(
    conn: &Connection,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<Vec<Appointment>, DatabaseError> {
    select_appointments(
        conn,
        "WHERE Appointment_Date >= ?1 AND Appointment_Date <= ?2 ORDER BY Appointment_Date",
        &[&format_datetime(from), &format_datetime(to)],
    )
}

pub fn delete_appointment(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM Appointments WHERE Appointment_ID = ?1",
        params![id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "appointment", id });
    }
    Ok(())
}

fn select_appointments(
    conn: &Connection,
    tail: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Appointment>, DatabaseError> {
    let sql = format!(
        "SELECT Appointment_ID, Patient_ID, Doc_ID, Appointment_Date, Statusof, Typeof, Speciality, Notes
         FROM Appointments {tail}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, appointment_row)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}

type RawAppointment = (
    i64,
    Option<i64>,
    i64,
    NaiveDateTime,
    i64,
    Option<String>,
    String,
    Option<String>,
);

fn appointment_row(row: &rusqlite::Row<'_>) -> Result<RawAppointment, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get::<_, NaiveDateTime>(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn appointment_from_row(raw: RawAppointment) -> Result<Appointment, DatabaseError> {
    let (id, patient_id, doctor_id, date, status, kind, specialty, notes) = raw;
    Ok(Appointment {
        id,
        patient_id,
        doctor_id,
        date,
        status: AppointmentStatus::from_code(status)?,
        kind,
        specialty,
        notes,
    })
}
