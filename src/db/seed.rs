//! Demo seed data: the canonical small dataset the acceptance
//! queries run against. Applied once to a fresh database.

use rusqlite::Connection;
use tracing;

use super::DatabaseError;

/// Apply the demo seed. Refuses to run against a database that already
/// holds doctors, so re-running `seed` cannot duplicate rows.
pub fn seed_demo_data(conn: &Connection) -> Result<(), DatabaseError> {
    let doctors: i64 = conn.query_row("SELECT COUNT(*) FROM Doctors", [], |row| row.get(0))?;
    if doctors > 0 {
        return Err(DatabaseError::ConstraintViolation(
            "demo seed requires an empty database".into(),
        ));
    }

    conn.execute_batch(include_str!("../../resources/seed/demo_seed.sql"))?;
    tracing::info!("Demo seed applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    #[test]
    fn seed_populates_all_tables() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        for (table, expected) in [
            ("Doctors", 8),
            ("Staff", 6),
            ("StaffShifts", 8),
            ("Patients", 12),
            ("Test_Records", 5),
            ("Appointments", 8),
            ("MedicalHistory", 4),
            ("Wards", 4),
            ("Beds", 10),
            ("Prescriptions", 3),
            ("Prescription_Details", 5),
            ("Notifications", 4),
        ] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, expected, "{table}: expected {expected}, got {count}");
        }
    }

    #[test]
    fn seed_twice_is_rejected() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();
        let result = seed_demo_data(&conn);
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));
    }

    #[test]
    fn intensive_care_ward_is_full() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let (capacity, occupied): (i64, i64) = conn
            .query_row(
                "SELECT w.Capacity,
                        (SELECT COUNT(*) FROM Beds b
                          WHERE b.Ward_ID = w.Ward_ID AND b.Status = 'Occupied')
                 FROM Wards w WHERE w.Ward_ID = 4",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(capacity, 1);
        assert_eq!(occupied, 1);
    }

    #[test]
    fn seeded_occupied_beds_have_patient_and_date() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        let broken: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM Beds
                 WHERE (Status = 'Occupied' AND (Patient_ID IS NULL OR Assigned_Date IS NULL))
                    OR (Status = 'Available' AND (Patient_ID IS NOT NULL OR Assigned_Date IS NOT NULL))",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(broken, 0);
    }
}
