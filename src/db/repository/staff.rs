use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_datetime, DatabaseError};
use crate::models::{NewStaff, NewStaffShift, Staff, StaffShift};

pub fn insert_staff(conn: &Connection, staff: &NewStaff) -> Result<Staff, DatabaseError> {
    conn.execute(
        "INSERT INTO Staff (Name, Department, Email, Hire_Date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            staff.name,
            staff.department,
            staff.email,
            format_datetime(staff.hire_date),
        ],
    )?;
    get_staff_member(conn, conn.last_insert_rowid())
}

pub fn get_staff_member(conn: &Connection, id: i64) -> Result<Staff, DatabaseError> {
    conn.query_row(
        "SELECT Staff_ID, Name, Department, Email, Hire_Date
         FROM Staff WHERE Staff_ID = ?1",
        params![id],
        staff_from_row,
    )
    .optional()?
    .ok_or(DatabaseError::NotFound { entity: "staff member", id })
}

pub fn list_staff(conn: &Connection) -> Result<Vec<Staff>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Staff_ID, Name, Department, Email, Hire_Date
         FROM Staff ORDER BY Staff_ID",
    )?;
    let rows = stmt.query_map([], staff_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_staff(
    conn: &Connection,
    id: i64,
    staff: &NewStaff,
) -> Result<Staff, DatabaseError> {
    let changed = conn.execute(
        "UPDATE Staff SET Name = ?1, Department = ?2, Email = ?3, Hire_Date = ?4
         WHERE Staff_ID = ?5",
        params![
            staff.name,
            staff.department,
            staff.email,
            format_datetime(staff.hire_date),
            id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "staff member", id });
    }
    get_staff_member(conn, id)
}

pub fn delete_staff(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM Staff WHERE Staff_ID = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "staff member", id });
    }
    Ok(())
}

// ── Shifts ──────────────────────────────────────────────────

/// The schema does not enforce shift ordering; the write boundary does.
fn validate_shift(shift: &NewStaffShift) -> Result<(), DatabaseError> {
    if shift.end <= shift.start {
        return Err(DatabaseError::ConstraintViolation(
            "shift end must be after shift start".into(),
        ));
    }
    Ok(())
}

pub fn insert_staff_shift(
    conn: &Connection,
    shift: &NewStaffShift,
) -> Result<StaffShift, DatabaseError> {
    validate_shift(shift)?;
    // Reject dangling staff references up front; the FK would catch it,
    // but this reports the id rather than a bare constraint message.
    get_staff_member(conn, shift.staff_id)?;
    conn.execute(
        "INSERT INTO StaffShifts (Staff_ID, Shift_Start, Shift_End)
         VALUES (?1, ?2, ?3)",
        params![
            shift.staff_id,
            format_datetime(shift.start),
            format_datetime(shift.end),
        ],
    )?;
    get_staff_shift(conn, conn.last_insert_rowid())
}

pub fn get_staff_shift(conn: &Connection, id: i64) -> Result<StaffShift, DatabaseError> {
    conn.query_row(
        "SELECT Shift_ID, Staff_ID, Shift_Start, Shift_End
         FROM StaffShifts WHERE Shift_ID = ?1",
        params![id],
        shift_from_row,
    )
    .optional()?
    .ok_or(DatabaseError::NotFound { entity: "staff shift", id })
}

pub fn list_staff_shifts(conn: &Connection) -> Result<Vec<StaffShift>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Shift_ID, Staff_ID, Shift_Start, Shift_End
         FROM StaffShifts ORDER BY Shift_Start",
    )?;
    let rows = stmt.query_map([], shift_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn list_shifts_for_staff(
    conn: &Connection,
    staff_id: i64,
) -> Result<Vec<StaffShift>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Shift_ID, Staff_ID, Shift_Start, Shift_End
         FROM StaffShifts WHERE Staff_ID = ?1 ORDER BY Shift_Start",
    )?;
    let rows = stmt.query_map(params![staff_id], shift_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_staff_shift(
    conn: &Connection,
    id: i64,
    shift: &NewStaffShift,
) -> Result<StaffShift, DatabaseError> {
    validate_shift(shift)?;
    let changed = conn.execute(
        "UPDATE StaffShifts SET Staff_ID = ?1, Shift_Start = ?2, Shift_End = ?3
         WHERE Shift_ID = ?4",
        params![
            shift.staff_id,
            format_datetime(shift.start),
            format_datetime(shift.end),
            id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "staff shift", id });
    }
    get_staff_shift(conn, id)
}

pub fn delete_staff_shift(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM StaffShifts WHERE Shift_ID = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound { entity: "staff shift", id });
    }
    Ok(())
}

fn staff_from_row(row: &rusqlite::Row<'_>) -> Result<Staff, rusqlite::Error> {
    Ok(Staff {
        id: row.get(0)?,
        name: row.get(1)?,
        department: row.get(2)?,
        email: row.get(3)?,
        hire_date: row.get::<_, NaiveDateTime>(4)?,
    })
}

fn shift_from_row(row: &rusqlite::Row<'_>) -> Result<StaffShift, rusqlite::Error> {
    Ok(StaffShift {
        id: row.get(0)?,
        staff_id: row.get(1)?,
        start: row.get::<_, NaiveDateTime>(2)?,
        end: row.get::<_, NaiveDateTime>(3)?,
    })
}
