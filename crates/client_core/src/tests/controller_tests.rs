use super::*;

#[test]
fn starts_on_dashboard_without_modal() {
    let controller = DashboardController::new();
    assert_eq!(controller.view(), View::Dashboard);
    assert_eq!(controller.modal(), None);
}

#[test]
fn navigating_to_current_view_is_a_no_op() {
    let mut controller = DashboardController::new();
    assert!(controller.navigate(View::Dashboard).is_empty());
}

#[test]
fn navigation_closes_open_modal() {
    let mut controller = DashboardController::new();
    controller.open_modal(Modal::GradeEdit(GradeId(4)));
    assert_eq!(controller.view(), View::Grades);

    let events = controller.navigate(View::Timetable);
    assert_eq!(
        events,
        vec![
            ControllerEvent::ModalClosed(Modal::GradeEdit(GradeId(4))),
            ControllerEvent::Navigated {
                from: View::Grades,
                to: View::Timetable,
            },
        ]
    );
    assert_eq!(controller.modal(), None);
}

#[test]
fn opening_a_modal_replaces_the_previous_one_in_the_same_view() {
    let mut controller = DashboardController::new();
    controller.open_modal(Modal::CreateCourse);
    let events = controller.open_modal(Modal::EditCourse(CourseId(2)));
    assert_eq!(
        events,
        vec![
            ControllerEvent::ModalClosed(Modal::CreateCourse),
            ControllerEvent::ModalOpened(Modal::EditCourse(CourseId(2))),
        ]
    );
    assert_eq!(controller.close_modal(), Some(ControllerEvent::ModalClosed(Modal::EditCourse(CourseId(2)))));
    assert_eq!(controller.close_modal(), None);
}

#[test]
fn quick_actions_route_like_the_dashboard_buttons() {
    let cases = [
        (QuickAction::CreateCourse, View::Enrollment),
        (QuickAction::OpenEnrollment, View::Enrollment),
        (QuickAction::RunGraduationAudit, View::Reports),
        (QuickAction::GenerateReports, View::Reports),
        (QuickAction::SyncCalendar, View::Timetable),
    ];
    for (action, expected) in cases {
        let mut controller = DashboardController::new();
        let events = controller.quick_action(action);
        assert_eq!(controller.view(), expected, "{action}");
        assert_eq!(
            events[0],
            ControllerEvent::Notice(format!("Action triggered: {}", action.title()))
        );
    }
}

#[test]
fn announcement_opens_modal_without_leaving_the_view() {
    let mut controller = DashboardController::new();
    controller.navigate(View::Students);
    let events = controller.quick_action(QuickAction::PublishAnnouncement);

    assert_eq!(controller.view(), View::Students);
    assert_eq!(controller.modal(), Some(Modal::Announcement));
    assert_eq!(events.last(), Some(&ControllerEvent::ModalOpened(Modal::Announcement)));
}

#[test]
fn kpi_selection_navigates_only_for_drill_down_kpis() {
    let mut controller = DashboardController::new();
    controller.kpi_selected(Kpi::PendingOverrides);
    assert_eq!(controller.view(), View::Enrollment);

    controller.kpi_selected(Kpi::TotalStudents);
    assert_eq!(controller.view(), View::Students);

    let events = controller.kpi_selected(Kpi::WaitlistSize);
    assert_eq!(controller.view(), View::Students);
    assert_eq!(
        events,
        vec![ControllerEvent::Notice(
            "Viewing details for: Waitlist Size".into()
        )]
    );
}

#[test]
fn upcoming_exams_kpi_opens_the_timetable() {
    let mut controller = DashboardController::new();
    controller.open_modal(Modal::StudentDetails(StudentId(1)));

    let events = controller.kpi_selected(Kpi::UpcomingExams);
    assert_eq!(controller.view(), View::Timetable);
    assert_eq!(controller.modal(), None);
    assert_eq!(
        events,
        vec![
            ControllerEvent::Notice("Viewing details for: Upcoming Exams".into()),
            ControllerEvent::ModalClosed(Modal::StudentDetails(StudentId(1))),
            ControllerEvent::Navigated {
                from: View::Students,
                to: View::Timetable,
            },
        ]
    );
    assert_eq!("upcoming exams".parse::<Kpi>(), Ok(Kpi::UpcomingExams));
}

#[test]
fn names_parse_with_dashes_underscores_or_spaces() {
    assert_eq!("timetable".parse::<View>(), Ok(View::Timetable));
    assert_eq!(
        "Run Graduation Audit".parse::<QuickAction>(),
        Ok(QuickAction::RunGraduationAudit)
    );
    assert_eq!("pending_overrides".parse::<Kpi>(), Ok(Kpi::PendingOverrides));
    assert_eq!(
        "library".parse::<View>(),
        Err(UnknownName {
            kind: "view",
            value: "library".into(),
        })
    );
}
