//! Bed and ward occupancy bookkeeping.
//!
//! Two invariants are enforced here rather than in the schema: a ward
//! never holds more occupied beds than its capacity, and a patient
//! occupies at most one bed at a time. Assignment runs inside an
//! immediate transaction so two concurrent callers cannot both take
//! the last bed; the conditional UPDATE is the final guard.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;

use crate::db::repository::{patient, ward};
use crate::db::{format_datetime, DatabaseError};
use crate::models::{Bed, BedStatus};

/// Assign the lowest-numbered Available bed in the ward to the patient.
pub fn assign_bed(
    conn: &mut Connection,
    patient_id: i64,
    ward_id: i64,
    now: NaiveDateTime,
) -> Result<Bed, DatabaseError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    patient::get_patient(&tx, patient_id)?;
    ward::get_ward(&tx, ward_id)?;

    // One occupied bed per patient, across all wards.
    let existing: Option<i64> = tx
        .query_row(
            "SELECT Bed_ID FROM Beds WHERE Patient_ID = ?1 AND Status = ?2",
            params![patient_id, BedStatus::Occupied.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(bed_id) = existing {
        return Err(DatabaseError::AlreadyAssigned { patient_id, bed_id });
    }

    // Deterministic tie-break: lowest bed id wins.
    let bed_id: Option<i64> = tx
        .query_row(
            "SELECT Bed_ID FROM Beds
             WHERE Ward_ID = ?1 AND Status = ?2
             ORDER BY Bed_ID LIMIT 1",
            params![ward_id, BedStatus::Available.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    let Some(bed_id) = bed_id else {
        tracing::warn!(patient_id, ward_id, "bed assignment rejected, ward full");
        return Err(DatabaseError::NoCapacity { ward_id });
    };

    let changed = tx.execute(
        "UPDATE Beds SET Patient_ID = ?1, Status = ?2, Assigned_Date = ?3
         WHERE Bed_ID = ?4 AND Status = ?5",
        params![
            patient_id,
            BedStatus::Occupied.as_str(),
            format_datetime(now),
            bed_id,
            BedStatus::Available.as_str(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::Conflict("bed occupancy changed concurrently"));
    }

    let bed = ward::get_bed(&tx, bed_id)?;
    tx.commit()?;
    tracing::info!(patient_id, ward_id, bed_id, "bed assigned");
    Ok(bed)
}

/// Release an occupied bed: clear the patient reference and assigned
/// date, set it Available. Releasing a free bed is a reported error.
pub fn release_bed(conn: &Connection, bed_id: i64) -> Result<Bed, DatabaseError> {
    let bed = ward::get_bed(conn, bed_id)?;
    if bed.status != BedStatus::Occupied {
        return Err(DatabaseError::InvalidTransition(format!(
            "bed {bed_id} is not occupied"
        )));
    }

    let changed = conn.execute(
        "UPDATE Beds SET Patient_ID = NULL, Status = ?1, Assigned_Date = NULL
         WHERE Bed_ID = ?2 AND Status = ?3",
        params![
            BedStatus::Available.as_str(),
            bed_id,
            BedStatus::Occupied.as_str(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::Conflict("bed occupancy changed concurrently"));
    }
    tracing::info!(bed_id, "bed released");
    ward::get_bed(conn, bed_id)
}

/// An occupancy invariant broken in the stored data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OccupancyViolation {
    /// More occupied beds than the ward's capacity.
    OverCapacity {
        ward_id: i64,
        capacity: i64,
        occupied: i64,
    },
    /// A patient occupying more than one bed.
    MultipleBeds { patient_id: i64, bed_ids: Vec<i64> },
}

/// Scan the whole store for occupancy invariant violations. Returns an
/// empty list when everything holds; used by tests and diagnostics.
pub fn check_invariants(conn: &Connection) -> Result<Vec<OccupancyViolation>, DatabaseError> {
    let mut violations = Vec::new();

    let mut stmt = conn.prepare(
        "SELECT w.Ward_ID, w.Capacity, COUNT(b.Bed_ID)
         FROM Wards w
         JOIN Beds b ON b.Ward_ID = w.Ward_ID AND b.Status = ?1
         GROUP BY w.Ward_ID
         HAVING COUNT(b.Bed_ID) > w.Capacity",
    )?;
    let rows = stmt.query_map(params![BedStatus::Occupied.as_str()], |row| {
        Ok(OccupancyViolation::OverCapacity {
            ward_id: row.get(0)?,
            capacity: row.get(1)?,
            occupied: row.get(2)?,
        })
    })?;
    for row in rows {
        violations.push(row?);
    }

    let mut stmt = conn.prepare(
        "SELECT Patient_ID, GROUP_CONCAT(Bed_ID)
         FROM Beds
         WHERE Status = ?1 AND Patient_ID IS NOT NULL
         GROUP BY Patient_ID
         HAVING COUNT(Bed_ID) > 1",
    )?;
    let rows = stmt.query_map(params![BedStatus::Occupied.as_str()], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (patient_id, ids) = row?;
        let mut bed_ids: Vec<i64> = ids.split(',').filter_map(|s| s.parse().ok()).collect();
        bed_ids.sort_unstable();
        violations.push(OccupancyViolation::MultipleBeds { patient_id, bed_ids });
    }

    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::seed::seed_demo_data;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-07-02 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn assign_takes_lowest_available_bed() {
        let conn = &mut open_memory_database().unwrap();
        seed_demo_data(conn).unwrap();

        // General Ward: bed 1 free, bed 2 occupied, beds 3-4 free.
        let bed = assign_bed(conn, 11, 1, now()).unwrap();
        assert_eq!(bed.id, 1);
        assert_eq!(bed.status, BedStatus::Occupied);
        assert_eq!(bed.patient_id, Some(11));
        assert!(bed.assigned_date.is_some());
    }

    #[test]
    fn full_ward_reports_no_capacity() {
        let conn = &mut open_memory_database().unwrap();
        seed_demo_data(conn).unwrap();

        // Ward 4 (Intensive Care) has capacity 1 and its one bed occupied.
        let result = assign_bed(conn, 11, 4, now());
        assert!(matches!(
            result,
            Err(DatabaseError::NoCapacity { ward_id: 4 })
        ));
    }

    #[test]
    fn patient_cannot_hold_two_beds() {
        let conn = &mut open_memory_database().unwrap();
        seed_demo_data(conn).unwrap();

        assign_bed(conn, 11, 1, now()).unwrap();
        let second = assign_bed(conn, 11, 2, now());
        assert!(matches!(
            second,
            Err(DatabaseError::AlreadyAssigned { patient_id: 11, bed_id: 1 })
        ));
    }

    #[test]
    fn unknown_patient_or_ward_not_found() {
        let conn = &mut open_memory_database().unwrap();
        seed_demo_data(conn).unwrap();

        assert!(matches!(
            assign_bed(conn, 500, 1, now()),
            Err(DatabaseError::NotFound { entity: "patient", .. })
        ));
        assert!(matches!(
            assign_bed(conn, 11, 500, now()),
            Err(DatabaseError::NotFound { entity: "ward", .. })
        ));
    }

    #[test]
    fn release_clears_bed_and_allows_reassignment() {
        let conn = &mut open_memory_database().unwrap();
        seed_demo_data(conn).unwrap();

        // Free the Intensive Care bed, then patient 11 can take it.
        let released = release_bed(conn, 10).unwrap();
        assert_eq!(released.status, BedStatus::Available);
        assert_eq!(released.patient_id, None);
        assert_eq!(released.assigned_date, None);

        let bed = assign_bed(conn, 11, 4, now()).unwrap();
        assert_eq!(bed.id, 10);
    }

    #[test]
    fn release_available_bed_rejected() {
        let conn = &mut open_memory_database().unwrap();
        seed_demo_data(conn).unwrap();

        let result = release_bed(conn, 1);
        assert!(matches!(result, Err(DatabaseError::InvalidTransition(_))));
    }

    #[test]
    fn invariants_hold_after_assign_release_sequences() {
        let conn = &mut open_memory_database().unwrap();
        seed_demo_data(conn).unwrap();

        assert!(check_invariants(conn).unwrap().is_empty());

        assign_bed(conn, 11, 1, now()).unwrap();
        assign_bed(conn, 12, 1, now()).unwrap();
        release_bed(conn, 1).unwrap();
        assign_bed(conn, 11, 3, now()).unwrap();

        assert!(check_invariants(conn).unwrap().is_empty());
    }

    #[test]
    fn invariant_check_reports_corrupted_data() {
        let conn = &mut open_memory_database().unwrap();
        seed_demo_data(conn).unwrap();

        // Bypass the occupancy API to simulate corruption: patient 2
        // occupying a second bed pushes Surgical Ward over capacity too.
        conn.execute(
            "UPDATE Beds SET Patient_ID = 2, Status = 'Occupied',
             Assigned_Date = '2025-07-02 10:00:00' WHERE Bed_ID = 9",
            [],
        )
        .unwrap();
        conn.execute(
            "UPDATE Wards SET Capacity = 1 WHERE Ward_ID = 3",
            [],
        )
        .unwrap();

        let violations = check_invariants(conn).unwrap();
        assert!(violations.contains(&OccupancyViolation::MultipleBeds {
            patient_id: 2,
            bed_ids: vec![2, 9],
        }));
        assert!(violations.contains(&OccupancyViolation::OverCapacity {
            ward_id: 3,
            capacity: 1,
            occupied: 2,
        }));
    }
}
