use super::*;

use client_core::{views::status_counts, Modal, View};
use portal_api::fixtures;

#[test]
fn student_table_lists_every_row_and_a_total() {
    let all = fixtures::students().expect("students");
    let rows: Vec<&Student> = all.iter().collect();
    let table = students(&rows);

    assert!(table.starts_with("NUMBER"));
    assert!(table.contains("STU001"));
    assert!(table.ends_with("5 student(s)\n"));
}

#[test]
fn course_table_flags_crowded_courses() {
    let all = fixtures::courses().expect("courses");
    let rows: Vec<&Course> = all.iter().collect();
    let table = courses(&rows);
    assert!(table.contains("(critical)"), "{table}");
}

#[test]
fn enrollment_table_ends_with_status_summary() {
    let all = fixtures::enrollments().expect("enrollments");
    let rows: Vec<&Enrollment> = all.iter().collect();
    let table = enrollments(&rows, &status_counts(&all));

    assert!(table.contains("override:"));
    assert!(table.ends_with("Enrolled: 2, Waitlisted: 1, Pending: 1\n"), "{table}");
}

#[test]
fn empty_collections_render_placeholders() {
    assert_eq!(alerts(&[]), "No active alerts\n");
    assert_eq!(conflicts(&[]), "No scheduling conflicts\n");
}

#[test]
fn controller_events_render_one_per_line() {
    let rendered = events(&[
        ControllerEvent::Notice("Action triggered: Sync Calendar".into()),
        ControllerEvent::Navigated {
            from: View::Dashboard,
            to: View::Timetable,
        },
        ControllerEvent::ModalOpened(Modal::Announcement),
    ]);
    assert_eq!(
        rendered,
        "Action triggered: Sync Calendar\nview: dashboard -> timetable\nopened Announcement\n"
    );
}

#[test]
fn filter_options_list_distinct_values() {
    let all = fixtures::timetable().expect("timetable");
    assert_eq!(
        options("rooms", &client_core::views::rooms(&all)),
        "rooms: A101, B205, C301\n"
    );
    assert_eq!(options("years", &[3u8, 2]), "years: 3, 2\n");
}
