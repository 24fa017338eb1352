use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(StudentId);
id_newtype!(CourseId);
id_newtype!(EnrollmentId);
id_newtype!(GradeId);
id_newtype!(SlotId);
id_newtype!(AlertId);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of labelled values. The label is what the dashboard
/// displays and what `FromStr` accepts (case-insensitive).
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: needle.to_string(),
                    })
            }
        }
    };
}

labelled_enum!(StudentStatus, "student status", {
    Active => "Active",
    Probation => "Probation",
    Graduated => "Graduated",
    Inactive => "Inactive",
});

labelled_enum!(EnrollmentStatus, "enrollment status", {
    Enrolled => "Enrolled",
    Waitlisted => "Waitlisted",
    Pending => "Pending",
    Dropped => "Dropped",
    Approved => "Approved",
    Rejected => "Rejected",
});

labelled_enum!(GradeStatus, "grade status", {
    Draft => "Draft",
    Submitted => "Submitted",
    Approved => "Approved",
    Published => "Published",
});

labelled_enum!(SessionType, "session type", {
    Lecture => "Lecture",
    Lab => "Lab",
    Tutorial => "Tutorial",
});

labelled_enum!(AlertKind, "alert kind", {
    Warning => "warning",
    Danger => "danger",
    Info => "info",
    Success => "success",
});

labelled_enum!(AlertPriority, "alert priority", {
    Low => "low",
    Medium => "medium",
    High => "high",
});

labelled_enum!(
    /// Report kinds offered by the analytics view.
    ReportType, "report type", {
    Enrollment => "enrollment",
    Grades => "grades",
    Attendance => "attendance",
    Financial => "financial",
    Graduation => "graduation",
    Faculty => "faculty",
});

impl ReportType {
    pub fn title(self) -> &'static str {
        match self {
            ReportType::Enrollment => "Enrollment Statistics",
            ReportType::Grades => "Grade Distribution",
            ReportType::Attendance => "Attendance Report",
            ReportType::Financial => "Financial Summary",
            ReportType::Graduation => "Graduation Audit",
            ReportType::Faculty => "Faculty Workload",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub program: String,
    pub year: u8,
    pub cgpa: f32,
    pub status: StudentStatus,
    pub enrollment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSchedule {
    pub days: Vec<String>,
    pub time: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub capacity: u32,
    pub enrolled: u32,
    pub waitlist: u32,
    pub department: String,
    pub semester: String,
    pub credits: u8,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub schedule: CourseSchedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_number: String,
    pub student_name: String,
    pub course_code: String,
    pub course_name: String,
    pub status: EnrollmentStatus,
    pub enrollment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub student_number: String,
    pub student_name: String,
    pub course_code: String,
    pub course_name: String,
    pub grade: String,
    pub semester: String,
    pub credits: u8,
    pub points: f32,
    pub submission_date: NaiveDate,
    pub status: GradeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub id: SlotId,
    pub course_code: String,
    pub course_name: String,
    pub day: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
    pub instructor: String,
    pub session_type: SessionType,
    pub capacity: u32,
    pub enrolled: u32,
}

impl TimetableSlot {
    /// Half-open interval overlap on the same weekday.
    pub fn overlaps(&self, other: &TimetableSlot) -> bool {
        self.day == other.day
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub priority: AlertPriority,
    pub is_read: bool,
}
