use super::*;

use portal_api::{MockPortalApi, Operation, SimulatedLatency};
use shared::domain::EnrollmentStatus;

fn mock() -> Arc<MockPortalApi> {
    Arc::new(MockPortalApi::new(SimulatedLatency::none()))
}

fn client_for(api: &Arc<MockPortalApi>) -> DashboardClient {
    DashboardClient::new(Arc::clone(api) as Arc<dyn PortalApi>)
}

#[tokio::test]
async fn resource_loaders_settle_with_fixture_data() {
    let api = mock();
    let client = client_for(&api);

    let students = client.students().settled().await;
    assert_eq!(students.phase, LoadPhase::Succeeded);
    assert_eq!(students.value.expect("students").len(), 5);

    let slots = client.timetable().settled().await;
    assert_eq!(slots.value.expect("slots").len(), 4);

    let alerts = client.alerts().settled().await;
    assert_eq!(alerts.value.expect("alerts").len(), 4);
    assert_eq!(api.call_count(), 3);
}

#[tokio::test]
async fn backend_failure_becomes_failed_state() {
    let api = Arc::new(
        MockPortalApi::new(SimulatedLatency::none()).with_failure(Operation::Grades, "network down"),
    );
    let client = client_for(&api);

    let state = client.grades().settled().await;
    assert_eq!(state.phase, LoadPhase::Failed);
    assert_eq!(state.failure.as_deref(), Some("network down"));
    assert_eq!(state.value, None);
}

#[tokio::test]
async fn status_update_then_refetch_reloads_enrollments() {
    let api = mock();
    let client = client_for(&api);
    let enrollments = client.enrollments();
    enrollments.settled().await;

    let ack = client
        .update_enrollment_status(EnrollmentStatusUpdate::new(
            EnrollmentId(2),
            EnrollmentStatus::Enrolled,
        ))
        .await
        .expect("update");
    assert!(ack.success);

    enrollments.refetch().await.expect("refetch");
    assert_eq!(enrollments.current_state().phase, LoadPhase::Succeeded);
    assert_eq!(api.call_count(), 3);
}

#[tokio::test]
async fn report_loader_regenerates_when_type_changes() {
    let api = mock();
    let client = client_for(&api);

    let report = client.report(ReportType::Enrollment);
    let first = report.settled().await.value.expect("report");
    assert_eq!(first.report_type, ReportType::Enrollment);

    assert!(report.observe(ReportType::Enrollment).is_none());
    report
        .observe(ReportType::Graduation)
        .expect("type changed")
        .await
        .expect("attempt");

    let second = report.current_state().value.expect("report");
    assert_eq!(second.report_type, ReportType::Graduation);
    assert_eq!(second.data, "Report data for graduation");
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn override_requires_a_reason() {
    let api = mock();
    let client = client_for(&api);

    let err = client
        .approve_override(EnrollmentId(4), "   ")
        .await
        .unwrap_err();
    let exception = err.downcast_ref::<ApiException>().expect("api exception");
    assert_eq!(exception.code, ErrorCode::Validation);
    assert_eq!(api.call_count(), 0);

    let ack = client
        .approve_override(EnrollmentId(4), "Prerequisite waiver granted")
        .await
        .expect("approve");
    assert_eq!(ack.message, "Enrollment status updated successfully");
}

#[tokio::test]
async fn submitting_no_grades_is_rejected_locally() {
    let api = mock();
    let client = client_for(&api);

    assert!(client.submit_grades(Vec::new()).await.is_err());
    assert_eq!(api.call_count(), 0);

    let grades = client.grades().settled().await.value.expect("grades");
    let ack = client.submit_grades(grades).await.expect("submit");
    assert_eq!(ack.message, "Grades submitted successfully");
}

#[tokio::test]
async fn editing_one_grade_resubmits_it_alone() {
    let api = mock();
    let client = client_for(&api);
    let grades = client.grades().settled().await.value.expect("grades");
    let draft = grades
        .into_iter()
        .find(|grade| grade.status == shared::domain::GradeStatus::Draft)
        .expect("draft grade");

    let err = client.update_grade(draft.clone(), " ").await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ApiException>().map(|e| e.code),
        Some(ErrorCode::Validation)
    );
    assert_eq!(api.call_count(), 1);

    let ack = client.update_grade(draft, "B+").await.expect("update");
    assert_eq!(ack.message, "Grade updated successfully");
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn failed_submission_fails_the_grade_edit() {
    let api = Arc::new(
        MockPortalApi::new(SimulatedLatency::none())
            .with_failure(Operation::SubmitGrades, "grading window closed"),
    );
    let client = client_for(&api);
    let grade = client.grades().settled().await.value.expect("grades").remove(0);

    let err = client.update_grade(grade, "A").await.unwrap_err();
    assert_eq!(err.to_string(), "grading window closed");
}

#[tokio::test]
async fn course_creation_requires_the_mandatory_fields() {
    let api = mock();
    let client = client_for(&api);

    let err = client.create_course(&CourseDraft::default()).unwrap_err();
    let exception = err.downcast_ref::<ApiException>().expect("api exception");
    assert_eq!(exception.code, ErrorCode::Validation);

    let draft = CourseDraft {
        code: "CS450".into(),
        name: "Distributed Systems".into(),
        instructor: "Dr. Perera".into(),
        ..CourseDraft::default()
    };
    let ack = client.create_course(&draft).expect("create");
    assert_eq!(ack.message, "Course created successfully!");
    assert_eq!(api.call_count(), 0);
}
