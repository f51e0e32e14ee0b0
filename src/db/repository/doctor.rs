use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{Doctor, NewDoctor};

pub fn insert_doctor(conn: &Connection, doctor: &NewDoctor) -> Result<Doctor, DatabaseError> {
    conn.execute(
        "INSERT INTO Doctors (Doc_Name, Speciality, Phone_Num, Email)
         VALUES (?1, ?2, ?3, ?4)",
        params![doctor.name, doctor.specialty, doctor.phone, doctor.email],
    )?;
    get_doctor(conn, conn.last_insert_rowid())
}

pub fn get_doctor(conn: &Connection, id: i64) -> Result<Doctor, DatabaseError> {
    conn.query_row(
        "SELECT Doc_ID, Doc_Name, Speciality, Phone_Num, Email
         FROM Doctors WHERE Doc_ID = ?1",
        params![id],
        doctor_from_row,
    )
    .optional()?
    .ok_or(DatabaseError::NotFound { entity: "doctor", id })
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Doc_ID, Doc_Name, Speciality, Phone_Num, Email
         FROM Doctors ORDER BY Doc_ID",
    )?;
    let rows = stmt.query_map([], doctor_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_doctor(
    conn: &Connection,
    id: i64,
    doctor: &NewDoctor,
) -> Result<Doctor, DatabaseError> {
    let changed = conn.execute(
        "UPDATE Doctors SET Doc_Name = ?1, Speciality = ?2, Phone_Num = ?3, Email = ?4
         WHERE Doc_ID = ?5",
        params![doctor.name, doctor.specialty, doctor.phone, doctor.email, id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "doctor", id });
    }
    get_doctor(conn, id)
}

/// Fails with `ConstraintViolation` while appointments, patients,
/// histories or prescriptions still reference the doctor.
pub fn delete_doctor(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM Doctors WHERE Doc_ID = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "doctor", id });
    }
    Ok(())
}

fn doctor_from_row(row: &rusqlite::Row<'_>) -> Result<Doctor, rusqlite::Error> {
    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        specialty: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::seed::seed_demo_data;

    #[test]
    fn crud_round_trip() {
        let conn = open_memory_database().unwrap();
        let created = insert_doctor(
            &conn,
            &NewDoctor {
                name: "Dr. Ada Osei".into(),
                specialty: "Radiologist".into(),
                phone: None,
                email: "ada.osei@x.example".into(),
            },
        )
        .unwrap();

        let mut updated = NewDoctor {
            name: created.name.clone(),
            specialty: created.specialty.clone(),
            phone: Some("555-0199".into()),
            email: created.email.clone(),
        };
        updated.specialty = "Oncologist".into();
        let after = update_doctor(&conn, created.id, &updated).unwrap();
        assert_eq!(after.specialty, "Oncologist");
        assert_eq!(after.phone.as_deref(), Some("555-0199"));

        delete_doctor(&conn, created.id).unwrap();
        assert!(matches!(
            get_doctor(&conn, created.id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_referenced_doctor_rejected() {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();

        // Doctor 1 is referenced by patients, appointments, history and
        // prescriptions; the delete must not orphan them.
        let result = delete_doctor(&conn, 1);
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));
        assert!(get_doctor(&conn, 1).is_ok());
    }

    #[test]
    fn update_unknown_doctor_not_found() {
        let conn = open_memory_database().unwrap();
        let result = update_doctor(
            &conn,
            42,
            &NewDoctor {
                name: "Dr. Nobody".into(),
                specialty: "Cardiologist".into(),
                phone: None,
                email: "nobody@x.example".into(),
            },
        );
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
