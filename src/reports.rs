//! The canned question catalog: read-only lookups the front-end
//! renders as a help menu. Every report is a pure read; an empty
//! result set is a valid answer, not an error.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db::repository::{appointment, patient};
use crate::db::{format_datetime, DatabaseError};
use crate::models::{Appointment, Doctor, Patient, Staff, StaffShift};

/// (doctor name, specialty) pair for the overview listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSpecialty {
    pub name: String,
    pub specialty: String,
}

pub fn doctors_by_specialty(
    conn: &Connection,
    specialty: &str,
) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Doc_ID, Doc_Name, Speciality, Phone_Num, Email
         FROM Doctors WHERE Speciality = ?1 ORDER BY Doc_ID",
    )?;
    let rows = stmt.query_map(params![specialty], |row| {
        Ok(Doctor {
            id: row.get(0)?,
            name: row.get(1)?,
            specialty: row.get(2)?,
            phone: row.get(3)?,
            email: row.get(4)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn doctors_with_specialties(
    conn: &Connection,
) -> Result<Vec<DoctorSpecialty>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT Doc_Name, Speciality FROM Doctors ORDER BY Doc_Name")?;
    let rows = stmt.query_map([], |row| {
        Ok(DoctorSpecialty {
            name: row.get(0)?,
            specialty: row.get(1)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn doctor_email_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<String>, DatabaseError> {
    conn.query_row(
        "SELECT Email FROM Doctors WHERE Doc_Name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn staff_by_department(
    conn: &Connection,
    department: &str,
) -> Result<Vec<Staff>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Staff_ID, Name, Department, Email, Hire_Date
         FROM Staff WHERE Department = ?1 ORDER BY Staff_ID",
    )?;
    let rows = stmt.query_map(params![department], |row| {
        Ok(Staff {
            id: row.get(0)?,
            name: row.get(1)?,
            department: row.get(2)?,
            email: row.get(3)?,
            hire_date: row.get::<_, NaiveDateTime>(4)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Shifts starting at or after `now` for one staff member.
pub fn upcoming_shifts_for_staff(
    conn: &Connection,
    staff_id: i64,
    now: NaiveDateTime,
) -> Result<Vec<StaffShift>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Shift_ID, Staff_ID, Shift_Start, Shift_End
         FROM StaffShifts
         WHERE Staff_ID = ?1 AND Shift_Start >= ?2
         ORDER BY Shift_Start",
    )?;
    let rows = stmt.query_map(params![staff_id, format_datetime(now)], |row| {
        Ok(StaffShift {
            id: row.get(0)?,
            staff_id: row.get(1)?,
            start: row.get::<_, NaiveDateTime>(2)?,
            end: row.get::<_, NaiveDateTime>(3)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// The doctor a patient is assigned to, by patient name. None when the
/// patient is unknown or has no assigned doctor.
pub fn doctor_for_patient(
    conn: &Connection,
    patient_name: &str,
) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        "SELECT d.Doc_ID, d.Doc_Name, d.Speciality, d.Phone_Num, d.Email
         FROM Patients p
         JOIN Doctors d ON p.Doc_ID = d.Doc_ID
         WHERE p.Patient_Name = ?1",
        params![patient_name],
        |row| {
            Ok(Doctor {
                id: row.get(0)?,
                name: row.get(1)?,
                specialty: row.get(2)?,
                phone: row.get(3)?,
                email: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn patients_of_doctor(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<Patient>, DatabaseError> {
    patient::list_patients_of_doctor(conn, doctor_id)
}

pub fn patient_email_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<String>, DatabaseError> {
    conn.query_row(
        "SELECT Email FROM Patients WHERE Patient_Name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn appointments_for_doctor(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<Appointment>, DatabaseError> {
    appointment::list_by_doctor(conn, doctor_id)
}

pub fn appointments_in_range(
    conn: &Connection,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<Vec<Appointment>, DatabaseError> {
    appointment::list_in_range(conn, from, to)
}

pub fn appointments_by_specialty(
    conn: &Connection,
    specialty: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    appointment::list_by_specialty(conn, specialty)
}

// ── Question catalog ────────────────────────────────────────

/// Which report answers a catalog question, and what argument it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportKind {
    DoctorsBySpecialty,
    DoctorsWithSpecialties,
    DoctorEmailByName,
    StaffByDepartment,
    UpcomingShiftsForStaff,
    DoctorForPatient,
    PatientsOfDoctor,
    PatientEmailByName,
    AppointmentsForDoctor,
    AppointmentsInRange,
    AppointmentsBySpecialty,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogEntry {
    pub category: &'static str,
    pub question: &'static str,
    pub kind: ReportKind,
}

/// The fixed question catalog, doubling as the acceptance checklist.
pub fn catalog() -> &'static [CatalogEntry] {
    &[
        CatalogEntry {
            category: "Doctors",
            question: "Which doctors have a given specialty?",
            kind: ReportKind::DoctorsBySpecialty,
        },
        CatalogEntry {
            category: "Doctors",
            question: "What are the names and specialties of all doctors?",
            kind: ReportKind::DoctorsWithSpecialties,
        },
        CatalogEntry {
            category: "Doctors",
            question: "What is the email of a doctor, by name?",
            kind: ReportKind::DoctorEmailByName,
        },
        CatalogEntry {
            category: "Staff",
            question: "Which staff members work in a given department?",
            kind: ReportKind::StaffByDepartment,
        },
        CatalogEntry {
            category: "Staff",
            question: "What are the upcoming shifts of a staff member?",
            kind: ReportKind::UpcomingShiftsForStaff,
        },
        CatalogEntry {
            category: "Patients",
            question: "Which doctor is assigned to a patient, by name?",
            kind: ReportKind::DoctorForPatient,
        },
        CatalogEntry {
            category: "Patients",
            question: "Which patients does a doctor care for?",
            kind: ReportKind::PatientsOfDoctor,
        },
        CatalogEntry {
            category: "Patients",
            question: "What is the contact email of a patient, by name?",
            kind: ReportKind::PatientEmailByName,
        },
        CatalogEntry {
            category: "Appointments",
            question: "What appointments does a doctor have?",
            kind: ReportKind::AppointmentsForDoctor,
        },
        CatalogEntry {
            category: "Appointments",
            question: "What appointments fall within a date range?",
            kind: ReportKind::AppointmentsInRange,
        },
        CatalogEntry {
            category: "Appointments",
            question: "What appointments exist for a given specialty?",
            kind: ReportKind::AppointmentsBySpecialty,
        },
    ]
}
