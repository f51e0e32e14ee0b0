use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Bed, BedStatus, NewWard, Ward};

pub fn insert_ward(conn: &Connection, ward: &NewWard) -> Result<Ward, DatabaseError> {
    conn.execute(
        "INSERT INTO Wards (Ward_Name, Capacity) VALUES (?1, ?2)",
        params![ward.name, ward.capacity],
    )?;
    get_ward(conn, conn.last_insert_rowid())
}

pub fn get_ward(conn: &Connection, id: i64) -> Result<Ward, DatabaseError> {
    conn.query_row(
        "SELECT Ward_ID, Ward_Name, Capacity FROM Wards WHERE Ward_ID = ?1",
        params![id],
        ward_from_row,
    )
    .optional()?
    .ok_or(DatabaseError::NotFound { entity: "ward", id })
}

pub fn list_wards(conn: &Connection) -> Result<Vec<Ward>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT Ward_ID, Ward_Name, Capacity FROM Wards ORDER BY Ward_ID")?;
    let rows = stmt.query_map([], ward_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// New beds always start Available. A ward can hold more physical beds
/// than its capacity; capacity bounds occupancy, not bed count.
pub fn insert_bed(conn: &Connection, ward_id: i64) -> Result<Bed, DatabaseError> {
    get_ward(conn, ward_id)?;
    conn.execute("INSERT INTO Beds (Ward_ID) VALUES (?1)", params![ward_id])?;
    get_bed(conn, conn.last_insert_rowid())
}

pub fn get_bed(conn: &Connection, id: i64) -> Result<Bed, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT Bed_ID, Ward_ID, Patient_ID, Status, Assigned_Date
             FROM Beds WHERE Bed_ID = ?1",
            params![id],
            bed_row,
        )
        .optional()?;
    match row {
        Some(raw) => bed_from_row(raw),
        None => Err(DatabaseError::NotFound { entity: "bed", id }),
    }
}

pub fn list_available_beds(conn: &Connection) -> Result<Vec<Bed>, DatabaseError> {
    select_beds(conn, "WHERE Status = 'Available' ORDER BY Bed_ID", &[])
}

pub fn list_occupied_beds(conn: &Connection) -> Result<Vec<Bed>, DatabaseError> {
    select_beds(conn, "WHERE Status = 'Occupied' ORDER BY Bed_ID", &[])
}

pub fn list_beds_in_ward(conn: &Connection, ward_id: i64) -> Result<Vec<Bed>, DatabaseError> {
    select_beds(conn, "WHERE Ward_ID = ?1 ORDER BY Bed_ID", &[&ward_id])
}

fn select_beds(
    conn: &Connection,
    tail: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Bed>, DatabaseError> {
    let sql = format!(
        "SELECT Bed_ID, Ward_ID, Patient_ID, Status, Assigned_Date FROM Beds {tail}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, bed_row)?;

    let mut beds = Vec::new();
    for row in rows {
        beds.push(bed_from_row(row?)?);
    }
    Ok(beds)
}

type RawBed = (i64, i64, Option<i64>, String, Option<NaiveDateTime>);

fn bed_row(row: &rusqlite::Row<'_>) -> Result<RawBed, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get::<_, Option<NaiveDateTime>>(4)?,
    ))
}

fn bed_from_row(raw: RawBed) -> Result<Bed, DatabaseError> {
    let (id, ward_id, patient_id, status, assigned_date) = raw;
    Ok(Bed {
        id,
        ward_id,
        patient_id,
        status: BedStatus::from_str(&status)?,
        assigned_date,
    })
}

fn ward_from_row(row: &rusqlite::Row<'_>) -> Result<Ward, rusqlite::Error> {
    Ok(Ward {
        id: row.get(0)?,
        name: row.get(1)?,
        capacity: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    #[test]
    fn new_beds_start_available() {
        let conn = open_memory_database().unwrap();
        let ward = insert_ward(&conn, &NewWard { name: "Recovery".into(), capacity: 2 }).unwrap();

        let bed = insert_bed(&conn, ward.id).unwrap();
        assert_eq!(bed.status, BedStatus::Available);
        assert_eq!(bed.patient_id, None);
        assert_eq!(bed.assigned_date, None);

        assert_eq!(list_beds_in_ward(&conn, ward.id).unwrap().len(), 1);
        assert_eq!(list_available_beds(&conn).unwrap().len(), 1);
        assert!(list_occupied_beds(&conn).unwrap().is_empty());
    }

    #[test]
    fn bed_in_unknown_ward_rejected() {
        let conn = open_memory_database().unwrap();
        let result = insert_bed(&conn, 12);
        assert!(matches!(
            result,
            Err(DatabaseError::NotFound { entity: "ward", .. })
        ));
    }

    #[test]
    fn negative_capacity_rejected() {
        let conn = open_memory_database().unwrap();
        let result = insert_ward(&conn, &NewWard { name: "Broken".into(), capacity: -1 });
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));
    }
}
