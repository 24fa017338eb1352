//! Plain-text tables for terminal output.

use std::{
    collections::BTreeMap,
    fmt::{Display, Write},
};

use client_core::{
    views::{occupancy_level, occupancy_percent, Conflict, DashboardKpis, OccupancyLevel},
    ControllerEvent,
};
use shared::{
    domain::{Alert, Course, Enrollment, EnrollmentStatus, Grade, Student, TimetableSlot},
    protocol::ReportResult,
};

fn occupancy_marker(level: OccupancyLevel) -> &'static str {
    match level {
        OccupancyLevel::Normal => "",
        OccupancyLevel::High => " (high)",
        OccupancyLevel::Critical => " (critical)",
    }
}

pub fn students(students: &[&Student]) -> String {
    let mut out = format!(
        "{:<8} {:<24} {:<26} {:>4} {:>5} {:<10}\n",
        "NUMBER", "NAME", "PROGRAM", "YEAR", "CGPA", "STATUS"
    );
    for s in students {
        let _ = writeln!(
            out,
            "{:<8} {:<24} {:<26} {:>4} {:>5.2} {:<10}",
            s.student_number,
            s.full_name(),
            s.program,
            s.year,
            s.cgpa,
            s.status
        );
    }
    let _ = writeln!(out, "{} student(s)", students.len());
    out
}

pub fn courses(courses: &[&Course]) -> String {
    let mut out = format!(
        "{:<7} {:<34} {:<20} {:>9} {:>8} {:>8}\n",
        "CODE", "NAME", "INSTRUCTOR", "SEATS", "FILLED", "WAITLIST"
    );
    for c in courses {
        let level = occupancy_level(c.enrolled, c.capacity);
        let _ = writeln!(
            out,
            "{:<7} {:<34} {:<20} {:>9} {:>7.0}% {:>8}{}",
            c.code,
            c.name,
            c.instructor,
            format!("{}/{}", c.enrolled, c.capacity),
            occupancy_percent(c.enrolled, c.capacity),
            c.waitlist,
            occupancy_marker(level)
        );
    }
    out
}

pub fn enrollments(
    enrollments: &[&Enrollment],
    counts: &BTreeMap<EnrollmentStatus, usize>,
) -> String {
    let mut out = format!(
        "{:>4} {:<8} {:<20} {:<7} {:<11} {:<10}\n",
        "ID", "STUDENT", "NAME", "COURSE", "STATUS", "DATE"
    );
    for e in enrollments {
        let _ = writeln!(
            out,
            "{:>4} {:<8} {:<20} {:<7} {:<11} {:<10}",
            e.id, e.student_number, e.student_name, e.course_code, e.status, e.enrollment_date
        );
        if let Some(reason) = &e.override_reason {
            let _ = writeln!(out, "     override: {reason}");
        }
    }
    let summary: Vec<String> = counts
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect();
    let _ = writeln!(out, "{}", summary.join(", "));
    out
}

pub fn grades(grades: &[&Grade]) -> String {
    let mut out = format!(
        "{:>4} {:<8} {:<20} {:<7} {:<5} {:>6} {:<10}\n",
        "ID", "STUDENT", "NAME", "COURSE", "GRADE", "POINTS", "STATUS"
    );
    for g in grades {
        let _ = writeln!(
            out,
            "{:>4} {:<8} {:<20} {:<7} {:<5} {:>6.1} {:<10}",
            g.id, g.student_number, g.student_name, g.course_code, g.grade, g.points, g.status
        );
    }
    out
}

pub fn timetable(slots: &[&TimetableSlot]) -> String {
    let mut out = format!(
        "{:<4} {:<11} {:<7} {:<6} {:<20} {:<9} {:>7}\n",
        "DAY", "TIME", "COURSE", "ROOM", "INSTRUCTOR", "TYPE", "SEATS"
    );
    for s in slots {
        let _ = writeln!(
            out,
            "{:<4} {}-{} {:<7} {:<6} {:<20} {:<9} {:>7}",
            s.day,
            s.start_time.format("%H:%M"),
            s.end_time.format("%H:%M"),
            s.course_code,
            s.room,
            s.instructor,
            s.session_type,
            format!("{}/{}", s.enrolled, s.capacity)
        );
    }
    out
}

pub fn conflicts(conflicts: &[Conflict]) -> String {
    if conflicts.is_empty() {
        return "No scheduling conflicts\n".to_string();
    }
    let mut out = format!("{} conflict(s)\n", conflicts.len());
    for conflict in conflicts {
        let _ = writeln!(out, "  ! {}", conflict.describe());
    }
    out
}

pub fn alerts(alerts: &[&Alert]) -> String {
    if alerts.is_empty() {
        return "No active alerts\n".to_string();
    }
    let mut out = String::new();
    for a in alerts {
        let unread = if a.is_read { ' ' } else { '*' };
        let _ = writeln!(
            out,
            "{unread} [{}] #{} {} ({}, {})",
            a.kind,
            a.id,
            a.title,
            a.priority,
            a.timestamp.format("%Y-%m-%d %H:%M")
        );
        let _ = writeln!(out, "      {}", a.message);
    }
    out
}

/// One line listing the values a filter flag accepts.
pub fn options<T: Display>(label: &str, values: &[T]) -> String {
    let values: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("{label}: {}\n", values.join(", "))
}

pub fn kpis(kpis: &DashboardKpis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total Students     {} ({} active)",
        kpis.total_students, kpis.active_students
    );
    let _ = writeln!(out, "Active Courses     {}", kpis.active_courses);
    let _ = writeln!(out, "Seats Filled       {:.1}%", kpis.seats_filled_percent);
    let _ = writeln!(out, "Waitlist Size      {}", kpis.waitlist_size);
    let _ = writeln!(out, "Pending Overrides  {}", kpis.pending_overrides);
    let _ = writeln!(out, "Unread Alerts      {}", kpis.unread_alerts);
    out
}

pub fn report(report: &ReportResult) -> String {
    format!(
        "{}\ngenerated {}\n{}\n",
        report.report_type.title(),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.data
    )
}

pub fn events(events: &[ControllerEvent]) -> String {
    let mut out = String::new();
    for event in events {
        let line = match event {
            ControllerEvent::Notice(message) => message.clone(),
            ControllerEvent::Navigated { from, to } => format!("view: {from} -> {to}"),
            ControllerEvent::ModalOpened(modal) => format!("opened {modal:?}"),
            ControllerEvent::ModalClosed(modal) => format!("closed {modal:?}"),
        };
        let _ = writeln!(out, "{line}");
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
