//! Console front-end. Thin by design: parse arguments, call the
//! library operation, render rows. All domain errors are printed and
//! turn into a non-zero exit code, never a panic.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use hospidesk::api::{self, AppState};
use hospidesk::db::repository::{
    appointment, doctor, medical_history, patient, prescription, staff, test_record, ward,
};
use hospidesk::db::seed::seed_demo_data;
use hospidesk::db::{self, DatabaseError, DATETIME_FORMAT};
use hospidesk::models::{
    Appointment, Bed, Doctor, NewAppointment, NewDoctor, NewMedicalHistory, NewPatient,
    NewPrescription, NewPrescriptionDetail, NewStaff, NewStaffShift, NewTestRecord, NewWard,
    Patient, Recipient, RecipientType, Staff,
};
use hospidesk::{config, lifecycle, notify, occupancy, reports};

#[derive(Parser)]
#[command(name = "hospidesk", version, about = "Hospital administrative records")]
struct Cli {
    /// Path to the records database (defaults to ~/Hospidesk/hospital.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database file and run migrations
    Init,
    /// Apply the demo seed to a fresh database
    Seed,
    /// Serve the HTTP front-end
    Serve {
        #[arg(long, default_value = "127.0.0.1:8420")]
        addr: SocketAddr,
    },
    /// Doctor management
    Doctor {
        #[command(subcommand)]
        command: DoctorCommand,
    },
    /// Staff and shift management
    Staff {
        #[command(subcommand)]
        command: StaffCommand,
    },
    /// Patient management
    Patient {
        #[command(subcommand)]
        command: PatientCommand,
    },
    /// Appointment lifecycle
    Appointment {
        #[command(subcommand)]
        command: AppointmentCommand,
    },
    /// Bed and ward occupancy
    Bed {
        #[command(subcommand)]
        command: BedCommand,
    },
    /// Notifications
    Notify {
        #[command(subcommand)]
        command: NotifyCommand,
    },
    /// Prescriptions
    Prescription {
        #[command(subcommand)]
        command: PrescriptionCommand,
    },
    /// Medical history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Test records
    Record {
        #[command(subcommand)]
        command: RecordCommand,
    },
    /// Canned reporting queries (the question catalog)
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Subcommand)]
enum DoctorCommand {
    Add {
        name: String,
        specialty: String,
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },
    List,
    Show { id: i64 },
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum StaffCommand {
    Add {
        name: String,
        department: String,
        email: String,
        /// Hire date, YYYY-MM-DD
        hire_date: String,
    },
    List,
    /// Record a shift for a staff member
    AddShift {
        staff_id: i64,
        /// YYYY-MM-DD HH:MM:SS
        start: String,
        end: String,
    },
    /// List a staff member's shifts
    Shifts { staff_id: i64 },
}

#[derive(Subcommand)]
enum PatientCommand {
    Add {
        name: String,
        records: String,
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        doctor: Option<i64>,
        #[arg(long)]
        staff: Option<i64>,
    },
    List,
    Show { id: i64 },
}

#[derive(Subcommand)]
enum AppointmentCommand {
    /// Create an Open appointment; specialty is copied from the doctor
    Create {
        doctor: i64,
        /// YYYY-MM-DD HH:MM:SS
        date: String,
        #[arg(long)]
        patient: Option<i64>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Attach a patient and advance Open → Scheduled
    Assign { id: i64, patient: i64 },
    Complete { id: i64 },
    Cancel { id: i64 },
    /// Expire past-due Scheduled appointments (repeat-safe)
    Expire,
    List {
        #[arg(long)]
        doctor: Option<i64>,
        #[arg(long)]
        patient: Option<i64>,
        #[arg(long)]
        specialty: Option<String>,
    },
}

#[derive(Subcommand)]
enum BedCommand {
    Available,
    Occupied,
    /// Assign the lowest free bed in a ward to a patient
    Assign { patient: i64, ward: i64 },
    Release { bed: i64 },
    /// Scan for occupancy invariant violations
    Check,
    /// Register a ward
    WardAdd { name: String, capacity: i64 },
    Wards,
    /// Add a physical bed to a ward (starts Available)
    Add { ward: i64 },
}

#[derive(Subcommand)]
enum PrescriptionCommand {
    /// Issue a prescription; repeat --med name:dosage:frequency:duration
    Create {
        patient: i64,
        doctor: i64,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long = "med", required = true)]
        medications: Vec<String>,
    },
    Show { id: i64 },
    ByDoctor { doctor_id: i64 },
    ByPatient { patient_id: i64 },
}

#[derive(Subcommand)]
enum HistoryCommand {
    Add {
        patient: i64,
        doctor: i64,
        diagnosis: String,
        #[arg(long)]
        treatment: Option<String>,
    },
    ByDoctor { doctor_id: i64 },
    ByPatient { patient_id: i64 },
}

#[derive(Subcommand)]
enum RecordCommand {
    Add {
        patient: i64,
        name: String,
        /// YYYY-MM-DD HH:MM:SS
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Test records for one patient
    List { patient: i64 },
}

#[derive(Subcommand)]
enum NotifyCommand {
    /// Send a notification to Doctor|Patient|Staff <id>
    Send {
        recipient_type: String,
        recipient_id: i64,
        message: String,
    },
    /// Mark a notification read
    Read { id: i64 },
    List {
        recipient_type: String,
        recipient_id: i64,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Print the question catalog
    Questions,
    DoctorsBySpecialty { specialty: String },
    Doctors,
    DoctorEmail { name: String },
    StaffByDepartment { department: String },
    UpcomingShifts { staff_id: i64 },
    DoctorForPatient { name: String },
    PatientsOfDoctor { doctor_id: i64 },
    PatientEmail { name: String },
    AppointmentsForDoctor { doctor_id: i64 },
    AppointmentsInRange { from: String, to: String },
    AppointmentsBySpecialty { specialty: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = cli.db.unwrap_or_else(config::database_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = db::open_database(&db_path)?;

    match cli.command {
        Command::Init => {
            println!("database ready at {}", db_path.display());
        }
        Command::Seed => {
            seed_demo_data(&conn)?;
            println!("demo seed applied");
        }
        Command::Serve { addr } => {
            api::router::serve(addr, AppState::new(conn)).await?;
        }
        Command::Doctor { command } => run_doctor(&conn, command)?,
        Command::Staff { command } => run_staff(&conn, command)?,
        Command::Patient { command } => run_patient(&conn, command)?,
        Command::Appointment { command } => run_appointment(&conn, command)?,
        Command::Bed { command } => run_bed(&mut conn, command)?,
        Command::Notify { command } => run_notify(&conn, command)?,
        Command::Prescription { command } => run_prescription(&mut conn, command)?,
        Command::History { command } => run_history(&conn, command)?,
        Command::Record { command } => run_record(&conn, command)?,
        Command::Report { command } => run_report(&conn, command)?,
    }
    Ok(())
}

fn run_doctor(conn: &Connection, command: DoctorCommand) -> Result<(), DatabaseError> {
    match command {
        DoctorCommand::Add { name, specialty, email, phone } => {
            let created = doctor::insert_doctor(
                conn,
                &NewDoctor { name, specialty, phone, email },
            )?;
            print_doctors(&[created]);
        }
        DoctorCommand::List => print_doctors(&doctor::list_doctors(conn)?),
        DoctorCommand::Show { id } => print_doctors(&[doctor::get_doctor(conn, id)?]),
        DoctorCommand::Remove { id } => {
            doctor::delete_doctor(conn, id)?;
            println!("doctor {id} removed");
        }
    }
    Ok(())
}

fn run_staff(conn: &Connection, command: StaffCommand) -> Result<(), DatabaseError> {
    match command {
        StaffCommand::Add { name, department, email, hire_date } => {
            let hire_date = parse_cli_datetime(&hire_date)?;
            let created = staff::insert_staff(
                conn,
                &NewStaff { name, department, email, hire_date },
            )?;
            print_staff(&[created]);
        }
        StaffCommand::List => print_staff(&staff::list_staff(conn)?),
        StaffCommand::AddShift { staff_id, start, end } => {
            let shift = staff::insert_staff_shift(
                conn,
                &NewStaffShift {
                    staff_id,
                    start: parse_cli_datetime(&start)?,
                    end: parse_cli_datetime(&end)?,
                },
            )?;
            println!(
                "shift {} for staff {}: {} .. {}",
                shift.id, shift.staff_id, shift.start, shift.end
            );
        }
        StaffCommand::Shifts { staff_id } => {
            for shift in staff::list_shifts_for_staff(conn, staff_id)? {
                println!("{:<4} {} .. {}", shift.id, shift.start, shift.end);
            }
        }
    }
    Ok(())
}

fn run_patient(conn: &Connection, command: PatientCommand) -> Result<(), DatabaseError> {
    match command {
        PatientCommand::Add { name, records, email, phone, doctor, staff } => {
            let created = patient::insert_patient(
                conn,
                &NewPatient {
                    name,
                    records,
                    phone,
                    email,
                    doctor_id: doctor,
                    staff_id: staff,
                },
            )?;
            print_patients(&[created]);
        }
        PatientCommand::List => print_patients(&patient::list_patients(conn)?),
        PatientCommand::Show { id } => print_patients(&[patient::get_patient(conn, id)?]),
    }
    Ok(())
}

fn run_appointment(conn: &Connection, command: AppointmentCommand) -> Result<(), DatabaseError> {
    match command {
        AppointmentCommand::Create { doctor, date, patient, kind, notes } => {
            let created = lifecycle::create_appointment(
                conn,
                &NewAppointment {
                    doctor_id: doctor,
                    patient_id: patient,
                    date: parse_cli_datetime(&date)?,
                    kind,
                    notes,
                },
            )?;
            print_appointments(&[created]);
        }
        AppointmentCommand::Assign { id, patient } => {
            print_appointments(&[lifecycle::assign_patient(conn, id, patient)?]);
        }
        AppointmentCommand::Complete { id } => {
            print_appointments(&[lifecycle::complete_appointment(conn, id)?]);
        }
        AppointmentCommand::Cancel { id } => {
            print_appointments(&[lifecycle::cancel_appointment(conn, id)?]);
        }
        AppointmentCommand::Expire => {
            let now = chrono::Local::now().naive_local();
            let expired = lifecycle::expire_due_appointments(conn, now)?;
            println!("{expired} appointment(s) expired");
        }
        AppointmentCommand::List { doctor, patient, specialty } => {
            let appointments = match (doctor, patient, specialty) {
                (Some(id), _, _) => appointment::list_by_doctor(conn, id)?,
                (_, Some(id), _) => appointment::list_by_patient(conn, id)?,
                (_, _, Some(s)) => appointment::list_by_specialty(conn, &s)?,
                _ => appointment::list_appointments(conn)?,
            };
            print_appointments(&appointments);
        }
    }
    Ok(())
}

fn run_bed(conn: &mut Connection, command: BedCommand) -> Result<(), DatabaseError> {
    match command {
        BedCommand::Available => print_beds(&ward::list_available_beds(conn)?),
        BedCommand::Occupied => print_beds(&ward::list_occupied_beds(conn)?),
        BedCommand::Assign { patient, ward } => {
            let now = chrono::Local::now().naive_local();
            let bed = occupancy::assign_bed(conn, patient, ward, now)?;
            print_beds(&[bed]);
        }
        BedCommand::Release { bed } => {
            print_beds(&[occupancy::release_bed(conn, bed)?]);
        }
        BedCommand::Check => {
            let violations = occupancy::check_invariants(conn)?;
            if violations.is_empty() {
                println!("occupancy invariants hold");
            } else {
                for violation in violations {
                    println!("{violation:?}");
                }
            }
        }
        BedCommand::WardAdd { name, capacity } => {
            let created = ward::insert_ward(conn, &NewWard { name, capacity })?;
            println!("{:<4} {:<20} capacity {}", created.id, created.name, created.capacity);
        }
        BedCommand::Wards => {
            for w in ward::list_wards(conn)? {
                println!("{:<4} {:<20} capacity {}", w.id, w.name, w.capacity);
            }
        }
        BedCommand::Add { ward: ward_id } => {
            print_beds(&[ward::insert_bed(conn, ward_id)?]);
        }
    }
    Ok(())
}

fn run_prescription(
    conn: &mut Connection,
    command: PrescriptionCommand,
) -> Result<(), DatabaseError> {
    match command {
        PrescriptionCommand::Create { patient, doctor, notes, medications } => {
            let details = medications
                .iter()
                .map(|spec| parse_medication(spec))
                .collect::<Result<Vec<_>, _>>()?;
            let created = prescription::create_prescription(
                conn,
                &NewPrescription {
                    patient_id: patient,
                    doctor_id: doctor,
                    date_issued: chrono::Local::now().naive_local(),
                    notes,
                },
                &details,
            )?;
            println!(
                "prescription {} issued with {} medication(s)",
                created.prescription.id,
                created.details.len()
            );
        }
        PrescriptionCommand::Show { id } => {
            let found = prescription::get_prescription(conn, id)?;
            println!(
                "{:<4} patient:{:<5} doctor:{:<5} issued {}",
                found.prescription.id,
                found.prescription.patient_id,
                found.prescription.doctor_id,
                found.prescription.date_issued
            );
            for d in &found.details {
                println!(
                    "     {:<20} {:<10} {:<18} {}",
                    d.medication_name, d.dosage, d.frequency, d.duration
                );
            }
        }
        PrescriptionCommand::ByDoctor { doctor_id } => {
            print_prescription_lines(&prescription::lines_by_doctor(conn, doctor_id)?);
        }
        PrescriptionCommand::ByPatient { patient_id } => {
            print_prescription_lines(&prescription::lines_by_patient(conn, patient_id)?);
        }
    }
    Ok(())
}

fn run_history(conn: &Connection, command: HistoryCommand) -> Result<(), DatabaseError> {
    match command {
        HistoryCommand::Add { patient, doctor, diagnosis, treatment } => {
            let created = medical_history::insert_medical_history(
                conn,
                &NewMedicalHistory {
                    patient_id: patient,
                    doctor_id: doctor,
                    diagnosis,
                    treatment,
                    record_date: chrono::Local::now().naive_local(),
                },
            )?;
            println!("history entry {} recorded", created.id);
        }
        HistoryCommand::ByDoctor { doctor_id } => {
            print_history(&medical_history::entries_by_doctor(conn, doctor_id)?);
        }
        HistoryCommand::ByPatient { patient_id } => {
            print_history(&medical_history::entries_by_patient(conn, patient_id)?);
        }
    }
    Ok(())
}

fn run_record(conn: &Connection, command: RecordCommand) -> Result<(), DatabaseError> {
    match command {
        RecordCommand::Add { patient, name, date, remarks } => {
            let test_date = date.as_deref().map(parse_cli_datetime).transpose()?;
            let created = test_record::insert_test_record(
                conn,
                &NewTestRecord {
                    patient_id: patient,
                    name: Some(name),
                    test_date,
                    remarks,
                },
            )?;
            println!("test record {} added", created.id);
        }
        RecordCommand::List { patient } => {
            for r in test_record::list_test_records_for_patient(conn, patient)? {
                println!(
                    "{:<4} {:<24} {:<20} {}",
                    r.id,
                    r.name.as_deref().unwrap_or("-"),
                    r.test_date.map_or("-".into(), |d| d.to_string()),
                    r.remarks.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

fn run_notify(conn: &Connection, command: NotifyCommand) -> Result<(), DatabaseError> {
    match command {
        NotifyCommand::Send { recipient_type, recipient_id, message } => {
            let recipient = parse_recipient(&recipient_type, recipient_id)?;
            let sent = notify::send_notification(
                conn,
                recipient,
                &message,
                chrono::Local::now().naive_local(),
            )?;
            println!("notification {} sent", sent.id);
        }
        NotifyCommand::Read { id } => {
            let read = notify::mark_read(conn, id, chrono::Local::now().naive_local())?;
            match read.read_at {
                Some(at) => println!("notification {} read at {at}", read.id),
                None => println!("notification {} read", read.id),
            }
        }
        NotifyCommand::List { recipient_type, recipient_id } => {
            let recipient = parse_recipient(&recipient_type, recipient_id)?;
            for n in notify::notifications_for(conn, recipient)? {
                println!(
                    "{:<4} [{}] {} {}",
                    n.id,
                    n.status.as_str(),
                    n.created_at,
                    n.message
                );
            }
        }
    }
    Ok(())
}

fn run_report(conn: &Connection, command: ReportCommand) -> Result<(), DatabaseError> {
    match command {
        ReportCommand::Questions => {
            let mut last_category = "";
            for entry in reports::catalog() {
                if entry.category != last_category {
                    println!("{}:", entry.category);
                    last_category = entry.category;
                }
                println!("  {}", entry.question);
            }
        }
        ReportCommand::DoctorsBySpecialty { specialty } => {
            print_doctors(&reports::doctors_by_specialty(conn, &specialty)?);
        }
        ReportCommand::Doctors => {
            for d in reports::doctors_with_specialties(conn)? {
                println!("{:<28} {}", d.name, d.specialty);
            }
        }
        ReportCommand::DoctorEmail { name } => {
            match reports::doctor_email_by_name(conn, &name)? {
                Some(email) => println!("{email}"),
                None => println!("no doctor named '{name}'"),
            }
        }
        ReportCommand::StaffByDepartment { department } => {
            print_staff(&reports::staff_by_department(conn, &department)?);
        }
        ReportCommand::UpcomingShifts { staff_id } => {
            let now = chrono::Local::now().naive_local();
            for shift in reports::upcoming_shifts_for_staff(conn, staff_id, now)? {
                println!("{:<4} {} .. {}", shift.id, shift.start, shift.end);
            }
        }
        ReportCommand::DoctorForPatient { name } => {
            match reports::doctor_for_patient(conn, &name)? {
                Some(doc) => print_doctors(&[doc]),
                None => println!("no assigned doctor for '{name}'"),
            }
        }
        ReportCommand::PatientsOfDoctor { doctor_id } => {
            print_patients(&reports::patients_of_doctor(conn, doctor_id)?);
        }
        ReportCommand::PatientEmail { name } => {
            match reports::patient_email_by_name(conn, &name)? {
                Some(email) => println!("{email}"),
                None => println!("no patient named '{name}'"),
            }
        }
        ReportCommand::AppointmentsForDoctor { doctor_id } => {
            print_appointments(&reports::appointments_for_doctor(conn, doctor_id)?);
        }
        ReportCommand::AppointmentsInRange { from, to } => {
            print_appointments(&reports::appointments_in_range(
                conn,
                parse_cli_datetime(&from)?,
                parse_cli_datetime(&to)?,
            )?);
        }
        ReportCommand::AppointmentsBySpecialty { specialty } => {
            print_appointments(&reports::appointments_by_specialty(conn, &specialty)?);
        }
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD` (midnight).
fn parse_cli_datetime(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|_| {
            DatabaseError::ConstraintViolation(format!(
                "invalid datetime '{s}', expected YYYY-MM-DD HH:MM:SS"
            ))
        })
}

fn parse_recipient(kind: &str, id: i64) -> Result<Recipient, DatabaseError> {
    let kind: RecipientType = kind.parse()?;
    Ok(Recipient::new(kind, id))
}

/// `name:dosage:frequency:duration`, e.g. `Lisinopril:10mg:Once a day:90 days`
fn parse_medication(spec: &str) -> Result<NewPrescriptionDetail, DatabaseError> {
    let parts: Vec<&str> = spec.splitn(4, ':').collect();
    match parts.as_slice() {
        [name, dosage, frequency, duration] => Ok(NewPrescriptionDetail {
            medication_name: name.trim().to_string(),
            dosage: dosage.trim().to_string(),
            frequency: frequency.trim().to_string(),
            duration: duration.trim().to_string(),
        }),
        _ => Err(DatabaseError::ConstraintViolation(format!(
            "invalid medication '{spec}', expected name:dosage:frequency:duration"
        ))),
    }
}

fn print_doctors(doctors: &[Doctor]) {
    for d in doctors {
        println!(
            "{:<4} {:<28} {:<22} {:<14} {}",
            d.id,
            d.name,
            d.specialty,
            d.phone.as_deref().unwrap_or("-"),
            d.email
        );
    }
}

fn print_staff(staff: &[Staff]) {
    for s in staff {
        println!(
            "{:<4} {:<24} {:<16} {:<32} hired {}",
            s.id,
            s.name,
            s.department,
            s.email,
            s.hire_date.date()
        );
    }
}

fn print_patients(patients: &[Patient]) {
    for p in patients {
        println!(
            "{:<4} {:<24} doctor:{:<5} {:<32} {}",
            p.id,
            p.name,
            p.doctor_id.map_or("-".into(), |id| id.to_string()),
            p.email,
            p.records
        );
    }
}

fn print_appointments(appointments: &[Appointment]) {
    for a in appointments {
        println!(
            "{:<4} {} [{:<9}] doctor:{:<4} patient:{:<5} {:<22} {}",
            a.id,
            a.date,
            a.status.as_str(),
            a.doctor_id,
            a.patient_id.map_or("-".into(), |id| id.to_string()),
            a.specialty,
            a.kind.as_deref().unwrap_or("-")
        );
    }
}

fn print_prescription_lines(lines: &[hospidesk::models::PrescriptionLine]) {
    for l in lines {
        println!(
            "{:<4} {:<24} {:<20} {:<18} {:<10} {:<18} {}",
            l.prescription_id,
            l.doctor_name,
            l.patient_name,
            l.medication_name,
            l.dosage,
            l.frequency,
            l.duration
        );
    }
}

fn print_history(entries: &[hospidesk::models::MedicalHistoryEntry]) {
    for e in entries {
        println!(
            "{:<4} {} {:<24} {:<20} {:<28} {}",
            e.id,
            e.record_date.date(),
            e.doctor_name,
            e.patient_name,
            e.diagnosis,
            e.treatment.as_deref().unwrap_or("-")
        );
    }
}

fn print_beds(beds: &[Bed]) {
    for b in beds {
        println!(
            "{:<4} ward:{:<4} [{:<9}] patient:{:<5} since {}",
            b.id,
            b.ward_id,
            b.status.as_str(),
            b.patient_id.map_or("-".into(), |id| id.to_string()),
            b.assigned_date.map_or("-".into(), |d| d.to_string())
        );
    }
}
