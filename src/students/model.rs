//! Typed student record shapes shared by the HTTP surface and the stores.

use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Serializer};
use std::fmt;

/// Store-native identifier of a student record.
///
/// Externally the identifier travels as the 24-character hex form of a MongoDB `ObjectId`.
/// Every lookup goes through [`StudentId::parse`], so a malformed id is rejected before any
/// store call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StudentId(ObjectId);

impl StudentId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parse the external string form, returning `None` when it is not a valid `ObjectId`.
    pub fn parse(raw: &str) -> Option<Self> {
        ObjectId::parse_str(raw).ok().map(Self)
    }

    /// Borrow the underlying MongoDB identifier.
    pub fn as_object_id(&self) -> &ObjectId {
        &self.0
    }
}

impl From<ObjectId> for StudentId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for StudentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_hex())
    }
}

/// A stored student record as returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    /// Identifier assigned by the store on insert.
    pub id: StudentId,
    /// Full name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Course the student is enrolled in.
    pub course: String,
    /// Grade point average, at most 4.0.
    pub gpa: f64,
}

/// A validated record awaiting insertion; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    /// Full name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Course the student is enrolled in.
    pub course: String,
    /// Grade point average, at most 4.0.
    pub gpa: f64,
}

impl NewStudent {
    /// Attach the store-assigned identifier.
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            course: self.course,
            gpa: self.gpa,
        }
    }
}

/// A validated partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentUpdate {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement course.
    pub course: Option<String>,
    /// Replacement grade point average.
    pub gpa: Option<f64>,
}

impl StudentUpdate {
    /// Whether the update carries no field changes.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.course.is_none() && self.gpa.is_none()
    }

    /// Apply the provided fields onto an existing record.
    pub fn apply_to(self, student: &mut Student) {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(email) = self.email {
            student.email = email;
        }
        if let Some(course) = self.course {
            student.course = course;
        }
        if let Some(gpa) = self.gpa {
            student.gpa = gpa;
        }
    }
}
