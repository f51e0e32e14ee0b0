use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_datetime, DatabaseError};
use crate::models::{NewTestRecord, TestRecord};

pub fn insert_test_record(
    conn: &Connection,
    record: &NewTestRecord,
) -> Result<TestRecord, DatabaseError> {
    conn.execute(
        "INSERT INTO Test_Records (Patient_ID, Record_Name, Test_Date, Remarks)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            record.patient_id,
            record.name,
            record.test_date.map(format_datetime),
            record.remarks,
        ],
    )?;
    get_test_record(conn, conn.last_insert_rowid())
}

pub fn get_test_record(conn: &Connection, id: i64) -> Result<TestRecord, DatabaseError> {
    conn.query_row(
        "SELECT Record_ID, Patient_ID, Record_Name, Test_Date, Remarks
         FROM Test_Records WHERE Record_ID = ?1",
        params![id],
        record_from_row,
    )
    .optional()?
    .ok_or(DatabaseError::NotFound { entity: "test record", id })
}

pub fn list_test_records(conn: &Connection) -> Result<Vec<TestRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Record_ID, Patient_ID, Record_Name, Test_Date, Remarks
         FROM Test_Records ORDER BY Record_ID",
    )?;
    let rows = stmt.query_map([], record_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn list_test_records_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<TestRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Record_ID, Patient_ID, Record_Name, Test_Date, Remarks
         FROM Test_Records WHERE Patient_ID = ?1 ORDER BY Test_Date",
    )?;
    let rows = stmt.query_map(params![patient_id], record_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_test_record(
    conn: &Connection,
    id: i64,
    record: &NewTestRecord,
) -> Result<TestRecord, DatabaseError> {
    let changed = conn.execute(
        "UPDATE Test_Records SET Patient_ID = ?1, Record_Name = ?2, Test_Date = ?3, Remarks = ?4
         WHERE Record_ID = ?5",
        params![
            record.patient_id,
            record.name,
            record.test_date.map(format_datetime),
            record.remarks,
            id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "test record", id });
    }
    get_test_record(conn, id)
}

pub fn delete_test_record(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM Test_Records WHERE Record_ID = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "test record", id });
    }
    Ok(())
}

fn record_from_row(row: &rusqlite::Row<'_>) -> Result<TestRecord, rusqlite::Error> {
    Ok(TestRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        test_date: row.get::<_, Option<NaiveDateTime>>(3)?,
        remarks: row.get(4)?,
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
    fn round_trip_with_update_and_delete() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let created = insert_test_record(
            &conn,
            &NewTestRecord {
                patient_id: 11,
                name: Some("Tilt Table Test".into()),
                test_date: Some(dt("2025-07-03 10:00:00")),
                remarks: None,
            },
        )
        .unwrap();

        let updated = update_test_record(
            &conn,
            created.id,
            &NewTestRecord {
                patient_id: 11,
                name: Some("Tilt Table Test".into()),
                test_date: Some(dt("2025-07-03 10:00:00")),
                remarks: Some("Positive, cardioinhibitory response".into()),
            },
        )
        .unwrap();
        assert_eq!(
            updated.remarks.as_deref(),
            Some("Positive, cardioinhibitory response")
        );

        let listed = list_test_records_for_patient(&conn, 11).unwrap();
        assert_eq!(listed.len(), 1);

        delete_test_record(&conn, created.id).unwrap();
        assert!(list_test_records_for_patient(&conn, 11).unwrap().is_empty());
    }

    #[test]
    fn record_for_unknown_patient_rejected() {
        let conn = open_memory_database().unwrap();
        let result = insert_test_record(
            &conn,
            &NewTestRecord {
                patient_id: 1,
                name: Some("ECG".into()),
                test_date: None,
                remarks: None,
            },
        );
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));
    }
}
