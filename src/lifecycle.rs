//! Appointment lifecycle, the one real state machine in the system.
//!
//! Open(0) → Scheduled(1) → Completed(2); Open/Scheduled → Cancelled(3);
//! Scheduled → Expired(4) once the appointment date passes.
//!
//! Every mutation is a conditional UPDATE on the expected prior status.
//! A pre-read classifies failures (missing row vs wrong state); if the
//! pre-read passes but the conditional update touches zero rows, a
//! concurrent caller won the race and this one gets `Conflict`.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::repository::{appointment, doctor, patient};
use crate::db::{format_datetime, DatabaseError};
use crate::models::{Appointment, AppointmentStatus, NewAppointment};

/// Create an appointment in the Open state.
///
/// The Speciality column is a snapshot of the doctor's specialty taken
/// here; later changes to the doctor do not rewrite history.
pub fn create_appointment(
    conn: &Connection,
    request: &NewAppointment,
) -> Result<Appointment, DatabaseError> {
    let doc = doctor::get_doctor(conn, request.doctor_id)?;
    if let Some(patient_id) = request.patient_id {
        patient::get_patient(conn, patient_id)?;
    }

    let created = appointment::insert_appointment(
        conn,
        request.patient_id,
        doc.id,
        request.date,
        AppointmentStatus::Open,
        request.kind.as_deref(),
        &doc.specialty,
        request.notes.as_deref(),
    )?;
    tracing::info!(appointment_id = created.id, doctor_id = doc.id, "appointment created");
    Ok(created)
}

/// Attach a patient to an Open appointment and advance it to Scheduled.
pub fn assign_patient(
    conn: &Connection,
    appointment_id: i64,
    patient_id: i64,
) -> Result<Appointment, DatabaseError> {
    patient::get_patient(conn, patient_id)?;
    let current = appointment::get_appointment(conn, appointment_id)?;
    require_status(&current, &[AppointmentStatus::Open], "assign")?;

    let changed = conn.execute(
        "UPDATE Appointments SET Patient_ID = ?1, Statusof = ?2
         WHERE Appointment_ID = ?3 AND Statusof = ?4",
        params![
            patient_id,
            AppointmentStatus::Scheduled.code(),
            appointment_id,
            AppointmentStatus::Open.code(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::Conflict("appointment status changed concurrently"));
    }
    tracing::info!(appointment_id, patient_id, "appointment scheduled");
    appointment::get_appointment(conn, appointment_id)
}

/// Scheduled → Completed.
pub fn complete_appointment(
    conn: &Connection,
    appointment_id: i64,
) -> Result<Appointment, DatabaseError> {
    let current = appointment::get_appointment(conn, appointment_id)?;
    require_status(&current, &[AppointmentStatus::Scheduled], "complete")?;

    let changed = conn.execute(
        "UPDATE Appointments SET Statusof = ?1
         WHERE Appointment_ID = ?2 AND Statusof = ?3",
        params![
            AppointmentStatus::Completed.code(),
            appointment_id,
            AppointmentStatus::Scheduled.code(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::Conflict("appointment status changed concurrently"));
    }
    tracing::info!(appointment_id, "appointment completed");
    appointment::get_appointment(conn, appointment_id)
}

/// Cancel from Open or Scheduled. Cancelling an already-terminal
/// appointment is a reported error, never a silent status rewrite.
pub fn cancel_appointment(
    conn: &Connection,
    appointment_id: i64,
) -> Result<Appointment, DatabaseError> {
    let current = appointment::get_appointment(conn, appointment_id)?;
    require_status(
        &current,
        &[AppointmentStatus::Open, AppointmentStatus::Scheduled],
        "cancel",
    )?;

    let changed = conn.execute(
        "UPDATE Appointments SET Statusof = ?1
         WHERE Appointment_ID = ?2 AND Statusof IN (?3, ?4)",
        params![
            AppointmentStatus::Cancelled.code(),
            appointment_id,
            AppointmentStatus::Open.code(),
            AppointmentStatus::Scheduled.code(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::Conflict("appointment status changed concurrently"));
    }
    tracing::info!(appointment_id, "appointment cancelled");
    appointment::get_appointment(conn, appointment_id)
}

/// Maintenance pass: every Scheduled appointment dated before `now`
/// becomes Expired. Safe to run repeatedly; Completed and Cancelled
/// rows are never touched. Returns the number of rows transitioned.
pub fn expire_due_appointments(
    conn: &Connection,
    now: NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE Appointments SET Statusof = ?1
         WHERE Statusof = ?2 AND Appointment_Date < ?3",
        params![
            AppointmentStatus::Expired.code(),
            AppointmentStatus::Scheduled.code(),
            format_datetime(now),
        ],
    )?;
    if changed > 0 {
        tracing::info!(count = changed, "expired past-due appointments");
    }
    Ok(changed)
}

fn require_status(
    appointment: &Appointment,
    allowed: &[AppointmentStatus],
    operation: &str,
) -> Result<(), DatabaseError> {
    if allowed.contains(&appointment.status) {
        return Ok(());
    }
    tracing::warn!(
        appointment_id = appointment.id,
        status = appointment.status.as_str(),
        operation,
        "rejected lifecycle transition"
    );
    Err(DatabaseError::InvalidTransition(format!(
        "cannot {operation} appointment {} while {}",
        appointment.id,
        appointment.status.as_str(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::{NewDoctor, NewPatient};
    use chrono::NaiveDate;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn setup(conn: &Connection) -> (i64, i64) {
        let doc = doctor::insert_doctor(
            conn,
            &NewDoctor {
                name: "Dr. John Smith".into(),
                specialty: "Cardiologist".into(),
                phone: Some("555-0101".into()),
                email: "john.smith@x.example".into(),
            },
        )
        .unwrap();
        let pat = patient::insert_patient(
            conn,
            &NewPatient {
                name: "Tom Harris".into(),
                records: "Hypertension".into(),
                phone: None,
                email: "tom.harris@x.example".into(),
                doctor_id: Some(doc.id),
                staff_id: None,
            },
        )
        .unwrap();
        (doc.id, pat.id)
    }

    fn open_appointment(conn: &Connection, doctor_id: i64) -> Appointment {
        create_appointment(
            conn,
            &NewAppointment {
                doctor_id,
                patient_id: None,
                date: dt("2025-07-10 09:00:00"),
                kind: Some("Consultation".into()),
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn create_starts_open_with_specialty_snapshot() {
        let conn = open_memory_database().unwrap();
        let (doc_id, _) = setup(&conn);

        let appt = open_appointment(&conn, doc_id);
        assert_eq!(appt.status, AppointmentStatus::Open);
        assert_eq!(appt.specialty, "Cardiologist");
        assert_eq!(appt.patient_id, None);
    }

    #[test]
    fn create_with_unknown_doctor_fails() {
        let conn = open_memory_database().unwrap();
        let result = create_appointment(
            &conn,
            &NewAppointment {
                doctor_id: 99,
                patient_id: None,
                date: dt("2025-07-10 09:00:00"),
                kind: None,
                notes: None,
            },
        );
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn specialty_snapshot_survives_doctor_change() {
        let conn = open_memory_database().unwrap();
        let (doc_id, _) = setup(&conn);
        let appt = open_appointment(&conn, doc_id);

        doctor::update_doctor(
            &conn,
            doc_id,
            &NewDoctor {
                name: "Dr. John Smith".into(),
                specialty: "Neurologist".into(),
                phone: None,
                email: "john.smith@x.example".into(),
            },
        )
        .unwrap();

        let reread = appointment::get_appointment(&conn, appt.id).unwrap();
        assert_eq!(reread.specialty, "Cardiologist");
    }

    #[test]
    fn full_lifecycle_then_cancel_is_rejected() {
        let conn = open_memory_database().unwrap();
        let (doc_id, pat_id) = setup(&conn);
        let appt = open_appointment(&conn, doc_id);

        let scheduled = assign_patient(&conn, appt.id, pat_id).unwrap();
        assert_eq!(scheduled.status, AppointmentStatus::Scheduled);
        assert_eq!(scheduled.patient_id, Some(pat_id));

        let completed = complete_appointment(&conn, appt.id).unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);

        let result = cancel_appointment(&conn, appt.id);
        assert!(matches!(result, Err(DatabaseError::InvalidTransition(_))));
    }

    #[test]
    fn assign_requires_open() {
        let conn = open_memory_database().unwrap();
        let (doc_id, pat_id) = setup(&conn);
        let appt = open_appointment(&conn, doc_id);

        assign_patient(&conn, appt.id, pat_id).unwrap();
        let again = assign_patient(&conn, appt.id, pat_id);
        assert!(matches!(again, Err(DatabaseError::InvalidTransition(_))));
    }

    #[test]
    fn assign_unknown_patient_fails() {
        let conn = open_memory_database().unwrap();
        let (doc_id, _) = setup(&conn);
        let appt = open_appointment(&conn, doc_id);

        let result = assign_patient(&conn, appt.id, 404);
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn complete_requires_scheduled() {
        let conn = open_memory_database().unwrap();
        let (doc_id, _) = setup(&conn);
        let appt = open_appointment(&conn, doc_id);

        let result = complete_appointment(&conn, appt.id);
        assert!(matches!(result, Err(DatabaseError::InvalidTransition(_))));
    }

    #[test]
    fn cancel_from_open_and_double_cancel_rejected() {
        let conn = open_memory_database().unwrap();
        let (doc_id, _) = setup(&conn);
        let appt = open_appointment(&conn, doc_id);

        let cancelled = cancel_appointment(&conn, appt.id).unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        let again = cancel_appointment(&conn, appt.id);
        assert!(matches!(again, Err(DatabaseError::InvalidTransition(_))));

        // The failed second cancel must not have corrupted the row.
        let reread = appointment::get_appointment(&conn, appt.id).unwrap();
        assert_eq!(reread.status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn expire_pass_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let (doc_id, pat_id) = setup(&conn);
        let appt = create_appointment(
            &conn,
            &NewAppointment {
                doctor_id: doc_id,
                patient_id: None,
                date: dt("2025-05-02 15:30:00"),
                kind: None,
                notes: None,
            },
        )
        .unwrap();
        assign_patient(&conn, appt.id, pat_id).unwrap();

        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(expire_due_appointments(&conn, now).unwrap(), 1);
        assert_eq!(expire_due_appointments(&conn, now).unwrap(), 0);

        let expired = appointment::get_appointment(&conn, appt.id).unwrap();
        assert_eq!(expired.status, AppointmentStatus::Expired);
    }

    #[test]
    fn expire_never_touches_completed_or_cancelled() {
        let conn = open_memory_database().unwrap();
        let (doc_id, pat_id) = setup(&conn);

        let done = open_appointment(&conn, doc_id);
        assign_patient(&conn, done.id, pat_id).unwrap();
        complete_appointment(&conn, done.id).unwrap();

        let dropped = open_appointment(&conn, doc_id);
        cancel_appointment(&conn, dropped.id).unwrap();

        // Far-future "now": both appointment dates are in the past.
        let now = dt("2030-01-01 00:00:00");
        assert_eq!(expire_due_appointments(&conn, now).unwrap(), 0);

        assert_eq!(
            appointment::get_appointment(&conn, done.id).unwrap().status,
            AppointmentStatus::Completed
        );
        assert_eq!(
            appointment::get_appointment(&conn, dropped.id).unwrap().status,
            AppointmentStatus::Cancelled
        );
    }

    #[test]
    fn open_appointment_does_not_expire() {
        let conn = open_memory_database().unwrap();
        let (doc_id, _) = setup(&conn);
        let appt = open_appointment(&conn, doc_id);

        let now = dt("2030-01-01 00:00:00");
        assert_eq!(expire_due_appointments(&conn, now).unwrap(), 0);
        assert_eq!(
            appointment::get_appointment(&conn, appt.id).unwrap().status,
            AppointmentStatus::Open
        );
    }
}
