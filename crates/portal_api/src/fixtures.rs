//! Mock datasets standing in for the student-information backend.

use serde::de::DeserializeOwned;
use shared::domain::{Alert, Course, Enrollment, Grade, Student, TimetableSlot};

use crate::PortalApiError;

const STUDENTS: &str = include_str!("../fixtures/students.json");
const COURSES: &str = include_str!("../fixtures/courses.json");
const ENROLLMENTS: &str = include_str!("../fixtures/enrollments.json");
const GRADES: &str = include_str!("../fixtures/grades.json");
const TIMETABLE: &str = include_str!("../fixtures/timetable.json");
const ALERTS: &str = include_str!("../fixtures/alerts.json");

fn decode<T: DeserializeOwned>(fixture: &'static str, raw: &str) -> Result<Vec<T>, PortalApiError> {
    serde_json::from_str(raw).map_err(|source| PortalApiError::Fixture { fixture, source })
}

pub fn students() -> Result<Vec<Student>, PortalApiError> {
    decode("students", STUDENTS)
}

pub fn courses() -> Result<Vec<Course>, PortalApiError> {
    decode("courses", COURSES)
}

pub fn enrollments() -> Result<Vec<Enrollment>, PortalApiError> {
    decode("enrollments", ENROLLMENTS)
}

pub fn grades() -> Result<Vec<Grade>, PortalApiError> {
    decode("grades", GRADES)
}

pub fn timetable() -> Result<Vec<TimetableSlot>, PortalApiError> {
    decode("timetable", TIMETABLE)
}

pub fn alerts() -> Result<Vec<Alert>, PortalApiError> {
    decode("alerts", ALERTS)
}
