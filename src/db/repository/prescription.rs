use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_datetime, DatabaseError};
use crate::models::{
    NewPrescription, NewPrescriptionDetail, Prescription, PrescriptionDetail, PrescriptionLine,
    PrescriptionWithDetails,
};

/// Insert a prescription and its medication lines in one transaction.
pub fn create_prescription(
    conn: &mut Connection,
    prescription: &NewPrescription,
    details: &[NewPrescriptionDetail],
) -> Result<PrescriptionWithDetails, DatabaseError> {
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO Prescriptions (Patient_ID, Doctor_ID, Date_Issued, Notes)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            prescription.patient_id,
            prescription.doctor_id,
            format_datetime(prescription.date_issued),
            prescription.notes,
        ],
    )?;
    let prescription_id = tx.last_insert_rowid();

    for detail in details {
        tx.execute(
            "INSERT INTO Prescription_Details (Prescription_ID, Medication_Name, Dosage, Frequency, Duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                prescription_id,
                detail.medication_name,
                detail.dosage,
                detail.frequency,
                detail.duration,
            ],
        )?;
    }

    let result = get_prescription(&tx, prescription_id)?;
    tx.commit()?;
    Ok(result)
}

pub fn get_prescription(
    conn: &Connection,
    id: i64,
) -> Result<PrescriptionWithDetails, DatabaseError> {
    let prescription = conn
        .query_row(
            "SELECT Prescription_ID, Patient_ID, Doctor_ID, Date_Issued, Notes
             FROM Prescriptions WHERE Prescription_ID = ?1",
            params![id],
            prescription_from_row,
        )
        .optional()?
        .ok_or(DatabaseError::NotFound { entity: "prescription", id })?;

    let mut stmt = conn.prepare(
        "SELECT Detail_ID, Prescription_ID, Medication_Name, Dosage, Frequency, Duration
         FROM Prescription_Details WHERE Prescription_ID = ?1 ORDER BY Detail_ID",
    )?;
    let rows = stmt.query_map(params![id], detail_from_row)?;
    let details: Result<Vec<_>, _> = rows.map(|r| r.map_err(DatabaseError::from)).collect();

    Ok(PrescriptionWithDetails {
        prescription,
        details: details?,
    })
}

pub fn update_prescription(
    conn: &Connection,
    id: i64,
    prescription: &NewPrescription,
) -> Result<Prescription, DatabaseError> {
    let changed = conn.execute(
        "UPDATE Prescriptions SET Patient_ID = ?1, Doctor_ID = ?2, Date_Issued = ?3, Notes = ?4
         WHERE Prescription_ID = ?5",
        params![
            prescription.patient_id,
            prescription.doctor_id,
            format_datetime(prescription.date_issued),
            prescription.notes,
            id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "prescription", id });
    }
    conn.query_row(
        "SELECT Prescription_ID, Patient_ID, Doctor_ID, Date_Issued, Notes
         FROM Prescriptions WHERE Prescription_ID = ?1",
        params![id],
        prescription_from_row,
    )
    .map_err(DatabaseError::from)
}

/// One row per medication line, joined with doctor and patient names,
/// the shape the front-end tables render.
pub fn lines_by_doctor(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<PrescriptionLine>, DatabaseError> {
    select_lines(conn, "WHERE r.Doctor_ID = ?1", &[&doctor_id])
}

pub fn lines_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<PrescriptionLine>, DatabaseError> {
    select_lines(conn, "WHERE r.Patient_ID = ?1", &[&patient_id])
}

fn select_lines(
    conn: &Connection,
    filter: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<PrescriptionLine>, DatabaseError> {
    let sql = format!(
        "SELECT r.Prescription_ID, d.Doc_Name, p.Patient_Name, r.Date_Issued, r.Notes,
                t.Medication_Name, t.Dosage, t.Frequency, t.Duration
         FROM Prescriptions r
         JOIN Doctors d ON r.Doctor_ID = d.Doc_ID
         JOIN Patients p ON r.Patient_ID = p.Patient_ID
         JOIN Prescription_Details t ON r.Prescription_ID = t.Prescription_ID
         {filter} ORDER BY r.Prescription_ID, t.Detail_ID"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok(PrescriptionLine {
            prescription_id: row.get(0)?,
            doctor_name: row.get(1)?,
            patient_name: row.get(2)?,
            date_issued: row.get::<_, NaiveDateTime>(3)?,
            notes: row.get(4)?,
            medication_name: row.get(5)?,
            dosage: row.get(6)?,
            frequency: row.get(7)?,
            duration: row.get(8)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn prescription_from_row(row: &rusqlite::Row<'_>) -> Result<Prescription, rusqlite::Error> {
    Ok(Prescription {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        date_issued: row.get::<_, NaiveDateTime>(3)?,
        notes: row.get(4)?,
    })
}

fn detail_from_row(row: &rusqlite::Row<'_>) -> Result<PrescriptionDetail, rusqlite::Error> {
    Ok(PrescriptionDetail {
        id: row.get(0)?,
        prescription_id: row.get(1)?,
        medication_name: row.get(2)?,
        dosage: row.get(3)?,
        frequency: row.get(4)?,
        duration: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::seed::seed_demo_data;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn create_inserts_prescription_with_lines() {
        let mut conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let created = create_prescription(
            &mut conn,
            &NewPrescription {
                patient_id: 2,
                doctor_id: 3,
                date_issued: dt("2025-07-02 10:00:00"),
                notes: Some("Post-operative pain management".into()),
            },
            &[
                NewPrescriptionDetail {
                    medication_name: "Ibuprofen".into(),
                    dosage: "400mg".into(),
                    frequency: "Three times a day".into(),
                    duration: "10 days".into(),
                },
                NewPrescriptionDetail {
                    medication_name: "Omeprazole".into(),
                    dosage: "20mg".into(),
                    frequency: "Once a day".into(),
                    duration: "10 days".into(),
                },
            ],
        )
        .unwrap();

        assert_eq!(created.details.len(), 2);
        let reread = get_prescription(&conn, created.prescription.id).unwrap();
        assert_eq!(reread.details.len(), 2);
        assert_eq!(reread.prescription.patient_id, 2);
    }

    #[test]
    fn create_for_unknown_patient_rolls_back() {
        let mut conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let result = create_prescription(
            &mut conn,
            &NewPrescription {
                patient_id: 999,
                doctor_id: 1,
                date_issued: dt("2025-07-02 10:00:00"),
                notes: None,
            },
            &[],
        );
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));

        // Nothing half-written.
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM Prescriptions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn lines_join_names_per_medication() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        // Seeded prescription 1: Dr. John Smith → Tom Harris, two lines.
        let lines = lines_by_patient(&conn, 1).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.doctor_name == "Dr. John Smith"));
        assert!(lines.iter().all(|l| l.patient_name == "Tom Harris"));

        let by_doctor = lines_by_doctor(&conn, 2).unwrap();
        assert_eq!(by_doctor.len(), 2);
    }

    #[test]
    fn update_rewrites_notes() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let updated = update_prescription(
            &conn,
            3,
            &NewPrescription {
                patient_id: 9,
                doctor_id: 7,
                date_issued: dt("2025-06-20 09:00:00"),
                notes: Some("Renewed for 90 days".into()),
            },
        )
        .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("Renewed for 90 days"));

        let missing = update_prescription(
            &conn,
            404,
            &NewPrescription {
                patient_id: 9,
                doctor_id: 7,
                date_issued: dt("2025-06-20 09:00:00"),
                notes: None,
            },
        );
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }
}
