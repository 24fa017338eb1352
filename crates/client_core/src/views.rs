//! Pure helpers behind the dashboard tables: filtering, option lists,
//! counters and derived indicators.

use std::collections::{BTreeMap, HashSet};

use chrono::Weekday;
use serde::Serialize;
use shared::domain::{
    Alert, AlertId, Course, Enrollment, EnrollmentStatus, Grade, GradeStatus, SlotId, Student,
    StudentStatus, TimetableSlot,
};

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Distinct values in first-seen order.
fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub program: Option<String>,
    pub year: Option<u8>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                contains_ci(&student.student_number, &term)
                    || contains_ci(&student.full_name(), &term)
                    || contains_ci(&student.email, &term)
            }
        };
        let matches_program = self
            .program
            .as_deref()
            .map_or(true, |program| student.program == program);
        let matches_year = self.year.map_or(true, |year| student.year == year);

        matches_search && matches_program && matches_year
    }

    pub fn apply<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        students.iter().filter(|s| self.matches(s)).collect()
    }
}

pub fn programs(students: &[Student]) -> Vec<String> {
    distinct(students.iter().map(|s| s.program.as_str()))
}

pub fn years(students: &[Student]) -> Vec<u8> {
    let mut seen = HashSet::new();
    students
        .iter()
        .map(|s| s.year)
        .filter(|year| seen.insert(*year))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub search: Option<String>,
    pub department: Option<String>,
    pub semester: Option<String>,
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                contains_ci(&course.code, &term)
                    || contains_ci(&course.name, &term)
                    || contains_ci(&course.instructor, &term)
            }
        };
        let matches_department = self
            .department
            .as_deref()
            .map_or(true, |department| course.department == department);
        let matches_semester = self
            .semester
            .as_deref()
            .map_or(true, |semester| course.semester == semester);

        matches_search && matches_department && matches_semester
    }

    pub fn apply<'a>(&self, courses: &'a [Course]) -> Vec<&'a Course> {
        courses.iter().filter(|c| self.matches(c)).collect()
    }
}

pub fn departments(courses: &[Course]) -> Vec<String> {
    distinct(courses.iter().map(|c| c.department.as_str()))
}

pub fn semesters(courses: &[Course]) -> Vec<String> {
    distinct(courses.iter().map(|c| c.semester.as_str()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OccupancyLevel {
    Normal,
    High,
    Critical,
}

/// Seats taken as a percentage. A zero-capacity room counts as full.
pub fn occupancy_percent(enrolled: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 100.0;
    }
    f64::from(enrolled) / f64::from(capacity) * 100.0
}

pub fn occupancy_level(enrolled: u32, capacity: u32) -> OccupancyLevel {
    let percent = occupancy_percent(enrolled, capacity);
    if percent >= 90.0 {
        OccupancyLevel::Critical
    } else if percent >= 70.0 {
        OccupancyLevel::High
    } else {
        OccupancyLevel::Normal
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub status: Option<EnrollmentStatus>,
}

impl EnrollmentFilter {
    pub fn apply<'a>(&self, enrollments: &'a [Enrollment]) -> Vec<&'a Enrollment> {
        enrollments
            .iter()
            .filter(|e| self.status.map_or(true, |status| e.status == status))
            .collect()
    }
}

pub fn status_counts(enrollments: &[Enrollment]) -> BTreeMap<EnrollmentStatus, usize> {
    let mut counts = BTreeMap::new();
    for enrollment in enrollments {
        *counts.entry(enrollment.status).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeFilter {
    pub course_code: Option<String>,
    pub status: Option<GradeStatus>,
}

impl GradeFilter {
    pub fn matches(&self, grade: &Grade) -> bool {
        self.course_code
            .as_deref()
            .map_or(true, |code| grade.course_code == code)
            && self.status.map_or(true, |status| grade.status == status)
    }

    pub fn apply<'a>(&self, grades: &'a [Grade]) -> Vec<&'a Grade> {
        grades.iter().filter(|g| self.matches(g)).collect()
    }
}

pub fn course_codes(grades: &[Grade]) -> Vec<String> {
    distinct(grades.iter().map(|g| g.course_code.as_str()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimetableFilter {
    pub day: Option<Weekday>,
    pub room: Option<String>,
}

impl TimetableFilter {
    pub fn matches(&self, slot: &TimetableSlot) -> bool {
        self.day.map_or(true, |day| slot.day == day)
            && self.room.as_deref().map_or(true, |room| slot.room == room)
    }

    pub fn apply<'a>(&self, slots: &'a [TimetableSlot]) -> Vec<&'a TimetableSlot> {
        slots.iter().filter(|s| self.matches(s)).collect()
    }
}

pub fn rooms(slots: &[TimetableSlot]) -> Vec<String> {
    distinct(slots.iter().map(|s| s.room.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    RoomDoubleBooked {
        room: String,
        day: Weekday,
        slots: (SlotId, SlotId),
    },
    InstructorOverlap {
        instructor: String,
        day: Weekday,
        slots: (SlotId, SlotId),
    },
    OverCapacity {
        slot: SlotId,
        course_code: String,
        enrolled: u32,
        capacity: u32,
    },
}

impl Conflict {
    pub fn describe(&self) -> String {
        match self {
            Conflict::RoomDoubleBooked { room, day, slots } => format!(
                "Room {room} double-booked on {day} (slots {} and {})",
                slots.0, slots.1
            ),
            Conflict::InstructorOverlap {
                instructor,
                day,
                slots,
            } => format!(
                "Instructor {instructor} has overlapping classes on {day} (slots {} and {})",
                slots.0, slots.1
            ),
            Conflict::OverCapacity {
                course_code,
                enrolled,
                capacity,
                ..
            } => format!("Student capacity exceeded in {course_code} ({enrolled}/{capacity})"),
        }
    }
}

/// Pairwise scan for double-booked rooms and instructors, then per-slot
/// capacity breaches. Each overlapping pair is reported once, lower slot
/// index first.
pub fn detect_conflicts(slots: &[TimetableSlot]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for (i, a) in slots.iter().enumerate() {
        for b in &slots[i + 1..] {
            if !a.overlaps(b) {
                continue;
            }
            if a.room == b.room {
                conflicts.push(Conflict::RoomDoubleBooked {
                    room: a.room.clone(),
                    day: a.day,
                    slots: (a.id, b.id),
                });
            }
            if a.instructor == b.instructor {
                conflicts.push(Conflict::InstructorOverlap {
                    instructor: a.instructor.clone(),
                    day: a.day,
                    slots: (a.id, b.id),
                });
            }
        }
    }

    conflicts.extend(
        slots
            .iter()
            .filter(|slot| slot.enrolled > slot.capacity)
            .map(|slot| Conflict::OverCapacity {
                slot: slot.id,
                course_code: slot.course_code.clone(),
                enrolled: slot.enrolled,
                capacity: slot.capacity,
            }),
    );

    conflicts
}

/// Dismissed-alert bookkeeping for the alert panel.
#[derive(Debug, Clone, Default)]
pub struct AlertInbox {
    dismissed: HashSet<AlertId>,
}

impl AlertInbox {
    pub fn dismiss(&mut self, id: AlertId) {
        self.dismissed.insert(id);
    }

    pub fn dismiss_all(&mut self, alerts: &[Alert]) {
        self.dismissed.extend(alerts.iter().map(|alert| alert.id));
    }

    pub fn is_dismissed(&self, id: AlertId) -> bool {
        self.dismissed.contains(&id)
    }

    pub fn active<'a>(&self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
        alerts
            .iter()
            .filter(|alert| !self.dismissed.contains(&alert.id))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardKpis {
    pub total_students: usize,
    pub active_students: usize,
    pub active_courses: usize,
    pub seats_filled_percent: f64,
    pub waitlist_size: u32,
    pub pending_overrides: usize,
    pub unread_alerts: usize,
}

impl DashboardKpis {
    pub fn compute(
        students: &[Student],
        courses: &[Course],
        enrollments: &[Enrollment],
        alerts: &[Alert],
    ) -> Self {
        let enrolled: u32 = courses.iter().map(|c| c.enrolled).sum();
        let capacity: u32 = courses.iter().map(|c| c.capacity).sum();
        let seats_filled_percent = if courses.is_empty() {
            0.0
        } else {
            occupancy_percent(enrolled, capacity)
        };

        Self {
            total_students: students.len(),
            active_students: students
                .iter()
                .filter(|s| s.status == StudentStatus::Active)
                .count(),
            active_courses: courses.len(),
            seats_filled_percent,
            waitlist_size: courses.iter().map(|c| c.waitlist).sum(),
            pending_overrides: enrollments
                .iter()
                .filter(|e| e.status == EnrollmentStatus::Pending)
                .count(),
            unread_alerts: alerts.iter().filter(|a| !a.is_read).count(),
        }
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
