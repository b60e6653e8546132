//! Student record types and inbound payload validation.

pub mod model;
pub mod validate;

pub use model::{NewStudent, Student, StudentId, StudentUpdate};
pub use validate::{
    FieldError, MAX_GPA, ValidationErrors, Violation, validate_new_student,
    validate_student_update,
};
