use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_datetime, DatabaseError};
use crate::models::{MedicalHistory, MedicalHistoryEntry, NewMedicalHistory};

pub fn insert_medical_history(
    conn: &Connection,
    history: &NewMedicalHistory,
) -> Result<MedicalHistory, DatabaseError> {
    conn.execute(
        "INSERT INTO MedicalHistory (Patient_ID, Doc_ID, Diagnosis, Treatment, Record_Date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            history.patient_id,
            history.doctor_id,
            history.diagnosis,
            history.treatment,
            format_datetime(history.record_date),
        ],
    )?;
    get_medical_history(conn, conn.last_insert_rowid())
}

pub fn get_medical_history(conn: &Connection, id: i64) -> Result<MedicalHistory, DatabaseError> {
    conn.query_row(
        "SELECT History_ID, Patient_ID, Doc_ID, Diagnosis, Treatment, Record_Date
         FROM MedicalHistory WHERE History_ID = ?1",
        params![id],
        history_from_row,
    )
    .optional()?
    .ok_or(DatabaseError::NotFound { entity: "medical history", id })
}

pub fn update_medical_history(
    conn: &Connection,
    id: i64,
    history: &NewMedicalHistory,
) -> Result<MedicalHistory, DatabaseError> {
    let changed = conn.execute(
        "UPDATE MedicalHistory SET Patient_ID = ?1, Doc_ID = ?2, Diagnosis = ?3,
         Treatment = ?4, Record_Date = ?5
         WHERE History_ID = ?6",
        params![
            history.patient_id,
            history.doctor_id,
            history.diagnosis,
            history.treatment,
            format_datetime(history.record_date),
            id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "medical history", id });
    }
    get_medical_history(conn, id)
}

pub fn delete_medical_history(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM MedicalHistory WHERE History_ID = ?1",
        params![id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "medical history", id });
    }
    Ok(())
}

pub fn entries_by_doctor(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<MedicalHistoryEntry>, DatabaseError> {
    select_entries(conn, "WHERE h.Doc_ID = ?1", &[&doctor_id])
}

pub fn entries_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<MedicalHistoryEntry>, DatabaseError> {
    select_entries(conn, "WHERE h.Patient_ID = ?1", &[&patient_id])
}

fn select_entries(
    conn: &Connection,
    filter: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<MedicalHistoryEntry>, DatabaseError> {
    let sql = format!(
        "SELECT h.History_ID, h.Diagnosis, h.Treatment, h.Record_Date, d.Doc_Name, p.Patient_Name
         FROM MedicalHistory h
         JOIN Doctors d ON h.Doc_ID = d.Doc_ID
         JOIN Patients p ON h.Patient_ID = p.Patient_ID
         {filter} ORDER BY h.Record_Date"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok(MedicalHistoryEntry {
            id: row.get(0)?,
            diagnosis: row.get(1)?,
            treatment: row.get(2)?,
            record_date: row.get::<_, NaiveDateTime>(3)?,
            doctor_name: row.get(4)?,
            patient_name: row.get(5)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn history_from_row(row: &rusqlite::Row<'_>) -> Result<MedicalHistory, rusqlite::Error> {
    Ok(MedicalHistory {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        diagnosis: row.get(3)?,
        treatment: row.get(4)?,
        record_date: row.get::<_, NaiveDateTime>(5)?,
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
    fn entries_join_doctor_and_patient_names() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let for_tom = entries_by_patient(&conn, 1).unwrap();
        assert_eq!(for_tom.len(), 1);
        assert_eq!(for_tom[0].doctor_name, "Dr. John Smith");
        assert_eq!(for_tom[0].patient_name, "Tom Harris");
        assert_eq!(for_tom[0].diagnosis, "Essential hypertension");

        let for_smith = entries_by_doctor(&conn, 1).unwrap();
        assert_eq!(for_smith.len(), 1);
    }

    #[test]
    fn update_and_delete_round_trip() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let created = insert_medical_history(
            &conn,
            &NewMedicalHistory {
                patient_id: 11,
                doctor_id: 7,
                diagnosis: "Vasovagal syncope".into(),
                treatment: None,
                record_date: dt("2025-07-02 09:00:00"),
            },
        )
        .unwrap();

        let updated = update_medical_history(
            &conn,
            created.id,
            &NewMedicalHistory {
                patient_id: 11,
                doctor_id: 7,
                diagnosis: "Vasovagal syncope".into(),
                treatment: Some("Hydration, avoid triggers".into()),
                record_date: created.record_date,
            },
        )
        .unwrap();
        assert_eq!(updated.treatment.as_deref(), Some("Hydration, avoid triggers"));

        delete_medical_history(&conn, created.id).unwrap();
        assert!(matches!(
            get_medical_history(&conn, created.id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn diagnosis_is_required() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO MedicalHistory (Patient_ID, Doc_ID, Diagnosis, Record_Date)
             VALUES (1, 1, NULL, '2025-07-02 09:00:00')",
            [],
        );
        assert!(result.is_err());
    }
}
