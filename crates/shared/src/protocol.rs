use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{CourseSchedule, EnrollmentId, EnrollmentStatus, ReportType},
    error::{ApiException, ErrorCode},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentStatusUpdate {
    pub enrollment_id: EnrollmentId,
    pub status: EnrollmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EnrollmentStatusUpdate {
    pub fn new(enrollment_id: EnrollmentId, status: EnrollmentStatus) -> Self {
        Self {
            enrollment_id,
            status,
            reason: None,
        }
    }

    /// Approval carrying the free-text justification an override needs.
    pub fn override_approval(enrollment_id: EnrollmentId, reason: impl Into<String>) -> Self {
        Self {
            enrollment_id,
            status: EnrollmentStatus::Approved,
            reason: Some(reason.into()),
        }
    }
}

/// Acknowledgement returned by mutating calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResult {
    pub success: bool,
    pub report_type: ReportType,
    pub data: String,
    pub generated_at: DateTime<Utc>,
}

/// Course form contents before the backend assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub capacity: u32,
    pub department: String,
    pub semester: String,
    pub credits: u8,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub schedule: CourseSchedule,
}

impl Default for CourseDraft {
    fn default() -> Self {
        Self {
            code: String::new(),
            name: String::new(),
            instructor: String::new(),
            capacity: 30,
            department: "Computer Science".into(),
            semester: "Spring 2024".into(),
            credits: 3,
            prerequisites: Vec::new(),
            schedule: CourseSchedule {
                days: vec!["Mon".into()],
                time: "10:00 AM - 11:30 AM".into(),
                room: "A101".into(),
            },
        }
    }
}

impl CourseDraft {
    /// Code, name and instructor are required.
    pub fn validate(&self) -> Result<(), ApiException> {
        let missing: Vec<&str> = [
            ("code", &self.code),
            ("name", &self.name),
            ("instructor", &self.instructor),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiException::new(
                ErrorCode::Validation,
                format!("Please fill in all required fields: {}", missing.join(", ")),
            ))
        }
    }
}
