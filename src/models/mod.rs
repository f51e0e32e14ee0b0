pub mod appointment;
pub mod bed;
pub mod doctor;
pub mod enums;
pub mod medical_history;
pub mod notification;
pub mod patient;
pub mod prescription;
pub mod staff;
pub mod test_record;
pub mod ward;

pub use appointment::*;
pub use bed::*;
pub use doctor::*;
pub use enums::*;
pub use medical_history::*;
pub use notification::*;
pub use patient::*;
pub use prescription::*;
pub use staff::*;
pub use test_record::*;
pub use ward::*;
