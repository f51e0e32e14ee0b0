use std::path::Path;

use rusqlite::Connection;
use tracing;

use super::DatabaseError;

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // 11 entity/relationship tables + schema_version = 12
        let count = count_tables(&conn).unwrap();
        assert_eq!(count, 12, "Expected 12 tables, got {count}");
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        // Run migrations again; should not error
        let result = run_migrations(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn foreign_keys_enabled() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn database_opens_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hospital.db");
        let conn = open_database(&path).unwrap();
        assert_eq!(count_tables(&conn).unwrap(), 12);

        // Re-open; should be idempotent
        let conn2 = open_database(&path).unwrap();
        assert_eq!(count_tables(&conn2).unwrap(), 12);
    }

    #[test]
    fn staff_email_unique_constraint() {
        let conn = open_memory_database().unwrap();

        conn.execute(
            "INSERT INTO Staff (Name, Department, Email, Hire_Date)
             VALUES ('Grace Miller', 'Nursing', 'grace@x.example', '2019-03-11 00:00:00')",
            [],
        )
        .unwrap();

        // Duplicate email should fail
        let result = conn.execute(
            "INSERT INTO Staff (Name, Department, Email, Hire_Date)
             VALUES ('Other Person', 'Pharmacy', 'grace@x.example', '2020-01-01 00:00:00')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn bed_status_check_constraint() {
        let conn = open_memory_database().unwrap();
        conn.execute("INSERT INTO Wards (Ward_Name, Capacity) VALUES ('General', 2)", [])
            .unwrap();

        let ok = conn.execute(
            "INSERT INTO Beds (Ward_ID, Status) VALUES (1, 'Available')",
            [],
        );
        assert!(ok.is_ok());

        let bad = conn.execute(
            "INSERT INTO Beds (Ward_ID, Status) VALUES (1, 'Broken')",
            [],
        );
        assert!(bad.is_err());
    }

    #[test]
    fn appointment_status_range_constraint() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO Doctors (Doc_Name, Speciality, Email)
             VALUES ('Dr. A', 'Cardiologist', 'a@x.example')",
            [],
        )
        .unwrap();

        let bad = conn.execute(
            "INSERT INTO Appointments (Doc_ID, Appointment_Date, Statusof, Speciality)
             VALUES (1, '2025-07-01 09:00:00', 7, 'Cardiologist')",
            [],
        );
        assert!(bad.is_err());
    }
}
