use super::*;

use client_core::LoadPhase;

#[test]
fn failed_load_suggests_trying_again() {
    let state: LoadState<Vec<u8>> = LoadState {
        value: Some(vec![1]),
        pending: false,
        failure: Some("network down".into()),
        phase: LoadPhase::Failed,
    };
    let err = loaded("grades", state).unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to load grades: network down. Please try again."
    );
}

#[test]
fn successful_load_yields_the_value() {
    let state = LoadState {
        value: Some(vec![1, 2]),
        pending: false,
        failure: None,
        phase: LoadPhase::Succeeded,
    };
    assert_eq!(loaded("grades", state).expect("value"), vec![1, 2]);
}

#[test]
fn grade_and_course_subcommands_parse() {
    let cli = Cli::try_parse_from(["portal", "edit-grade", "4", "B+"]).expect("edit-grade");
    assert!(matches!(cli.command, Command::EditGrade { id: 4, ref grade } if grade == "B+"));

    let cli = Cli::try_parse_from([
        "portal",
        "create-course",
        "--code",
        "CS450",
        "--name",
        "Distributed Systems",
        "--capacity",
        "40",
    ])
    .expect("create-course");
    match cli.command {
        Command::CreateCourse {
            code,
            instructor,
            capacity,
            ..
        } => {
            assert_eq!(code, "CS450");
            assert_eq!(instructor, "");
            assert_eq!(capacity, Some(40));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn create_course_without_instructor_is_rejected() {
    let app = App {
        client: DashboardClient::new(Arc::new(MockPortalApi::new(
            portal_api::SimulatedLatency::none(),
        ))),
        json: false,
    };
    let draft = CourseDraft {
        code: "CS450".into(),
        name: "Distributed Systems".into(),
        ..CourseDraft::default()
    };
    let err = app.create_course(draft).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ApiException>().map(|e| e.code),
        Some(ErrorCode::Validation)
    );
}

#[tokio::test]
async fn editing_an_unknown_grade_is_not_found() {
    let app = App {
        client: DashboardClient::new(Arc::new(MockPortalApi::new(
            portal_api::SimulatedLatency::none(),
        ))),
        json: true,
    };
    let err = app.edit_grade(GradeId(99), "A").await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ApiException>().map(|e| e.code),
        Some(ErrorCode::NotFound)
    );
}
