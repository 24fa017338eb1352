use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::Weekday;
use clap::{Parser, Subcommand};
use client_core::{
    views::{
        course_codes, departments, detect_conflicts, programs, rooms, semesters, status_counts,
        years, AlertInbox, CourseFilter, DashboardKpis, EnrollmentFilter, GradeFilter,
        StudentFilter, TimetableFilter,
    },
    ControllerEvent, DashboardClient, DashboardController, Kpi, LoadState, QuickAction, View,
};
use portal_api::{MockPortalApi, PortalApi};
use serde::Serialize;
use shared::{
    domain::{AlertId, EnrollmentId, EnrollmentStatus, GradeId, GradeStatus, ReportType},
    error::{ApiException, ErrorCode},
    protocol::{CourseDraft, EnrollmentStatusUpdate},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "portal", about = "University portal dashboard")]
struct Cli {
    /// Config file; defaults to ./portal.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,
    /// Skip the simulated backend delay.
    #[arg(long, global = true)]
    no_latency: bool,
    /// Make one backend operation fail, e.g. `grades`.
    #[arg(long)]
    fail: Option<String>,
    #[arg(long)]
    log_filter: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Students {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        program: Option<String>,
        #[arg(long)]
        year: Option<u8>,
    },
    Courses {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        semester: Option<String>,
    },
    Enrollments {
        #[arg(long)]
        status: Option<EnrollmentStatus>,
    },
    Grades {
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        status: Option<GradeStatus>,
    },
    Timetable {
        #[arg(long, value_parser = parse_weekday)]
        day: Option<Weekday>,
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        conflicts: bool,
    },
    Alerts {
        #[arg(long, num_args = 1..)]
        dismiss: Vec<i64>,
    },
    Dashboard,
    UpdateEnrollment {
        id: i64,
        status: EnrollmentStatus,
        #[arg(long)]
        reason: Option<String>,
    },
    SubmitGrades {
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        status: Option<GradeStatus>,
    },
    /// Resubmits one grade with a new value.
    EditGrade {
        id: i64,
        grade: String,
    },
    CreateCourse {
        #[arg(long, default_value = "")]
        code: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        instructor: String,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        semester: Option<String>,
        #[arg(long)]
        credits: Option<u8>,
    },
    /// Generates each report type in turn on one keyed loader.
    Report {
        #[arg(required = true)]
        report_types: Vec<ReportType>,
    },
    QuickAction {
        action: QuickAction,
    },
    Kpi {
        kpi: Kpi,
    },
}

fn parse_weekday(raw: &str) -> Result<Weekday, String> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| format!("unknown day '{raw}'"))
}

/// Unwraps a settled load, turning a failed attempt into an error.
fn loaded<T>(resource: &str, state: LoadState<T>) -> Result<T> {
    if let Some(failure) = state.failure {
        bail!("failed to load {resource}: {failure}. Please try again.");
    }
    state
        .value
        .with_context(|| format!("{resource} did not load"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

struct App {
    client: DashboardClient,
    json: bool,
}

impl App {
    async fn students(&self, filter: StudentFilter) -> Result<()> {
        let all = loaded("students", self.client.students().settled().await)?;
        let rows = filter.apply(&all);
        if self.json {
            return print_json(&rows);
        }
        print!("{}", render::students(&rows));
        print!("{}", render::options("programs", &programs(&all)));
        print!("{}", render::options("years", &years(&all)));
        Ok(())
    }

    async fn courses(&self, filter: CourseFilter) -> Result<()> {
        let all = loaded("courses", self.client.courses().settled().await)?;
        let rows = filter.apply(&all);
        if self.json {
            return print_json(&rows);
        }
        print!("{}", render::courses(&rows));
        print!("{}", render::options("departments", &departments(&all)));
        print!("{}", render::options("semesters", &semesters(&all)));
        Ok(())
    }

    async fn enrollments(&self, filter: EnrollmentFilter) -> Result<()> {
        let all = loaded("enrollments", self.client.enrollments().settled().await)?;
        let rows = filter.apply(&all);
        let counts = status_counts(&all);
        if self.json {
            return print_json(&serde_json::json!({ "enrollments": rows, "counts": counts }));
        }
        print!("{}", render::enrollments(&rows, &counts));
        Ok(())
    }

    async fn grades(&self, filter: GradeFilter) -> Result<()> {
        let all = loaded("grades", self.client.grades().settled().await)?;
        let rows = filter.apply(&all);
        if self.json {
            return print_json(&rows);
        }
        print!("{}", render::grades(&rows));
        print!("{}", render::options("courses", &course_codes(&all)));
        Ok(())
    }

    async fn timetable(&self, filter: TimetableFilter, show_conflicts: bool) -> Result<()> {
        let all = loaded("timetable", self.client.timetable().settled().await)?;
        let rows = filter.apply(&all);
        let selected: Vec<_> = rows.iter().copied().cloned().collect();
        let conflicts = show_conflicts.then(|| detect_conflicts(&selected));

        if self.json {
            return print_json(&serde_json::json!({ "slots": rows, "conflicts": conflicts }));
        }
        print!("{}", render::timetable(&rows));
        print!("{}", render::options("rooms", &rooms(&all)));
        if let Some(conflicts) = conflicts {
            print!("{}", render::conflicts(&conflicts));
        }
        Ok(())
    }

    async fn alerts(&self, dismiss: &[i64]) -> Result<()> {
        let all = loaded("alerts", self.client.alerts().settled().await)?;
        let mut inbox = AlertInbox::default();
        for id in dismiss {
            inbox.dismiss(AlertId(*id));
        }
        let active = inbox.active(&all);
        if self.json {
            return print_json(&active);
        }
        print!("{}", render::alerts(&active));
        Ok(())
    }

    async fn dashboard(&self) -> Result<()> {
        let loaders = (
            self.client.students(),
            self.client.courses(),
            self.client.enrollments(),
            self.client.alerts(),
        );
        let (students, courses, enrollments, alerts) = tokio::join!(
            loaders.0.settled(),
            loaders.1.settled(),
            loaders.2.settled(),
            loaders.3.settled()
        );
        let students = loaded("students", students)?;
        let courses = loaded("courses", courses)?;
        let enrollments = loaded("enrollments", enrollments)?;
        let alerts = loaded("alerts", alerts)?;

        let kpis = DashboardKpis::compute(&students, &courses, &enrollments, &alerts);
        let active = AlertInbox::default().active(&alerts);
        if self.json {
            return print_json(&serde_json::json!({ "kpis": kpis, "alerts": active }));
        }
        print!("{}", render::kpis(&kpis));
        println!();
        print!("{}", render::alerts(&active));
        Ok(())
    }

    async fn update_enrollment(
        &self,
        id: EnrollmentId,
        status: EnrollmentStatus,
        reason: Option<String>,
    ) -> Result<()> {
        let enrollments = self.client.enrollments();
        let current = loaded("enrollments", enrollments.settled().await)?;
        if !current.iter().any(|enrollment| enrollment.id == id) {
            return Err(
                ApiException::new(ErrorCode::NotFound, format!("enrollment {id} not found")).into(),
            );
        }

        let ack = match (status, reason) {
            (EnrollmentStatus::Approved, Some(reason)) => {
                self.client.approve_override(id, &reason).await?
            }
            (status, reason) => {
                let mut update = EnrollmentStatusUpdate::new(id, status);
                update.reason = reason;
                self.client.update_enrollment_status(update).await?
            }
        };
        info!(enrollment_id = id.0, %status, "{}", ack.message);

        enrollments.refetch().await.context("enrollment refetch panicked")?;
        let refreshed = loaded("enrollments", enrollments.current_state())?;
        if self.json {
            return print_json(&serde_json::json!({ "ack": ack, "enrollments": refreshed }));
        }
        println!("{}", ack.message);
        let rows: Vec<_> = refreshed.iter().collect();
        print!("{}", render::enrollments(&rows, &status_counts(&refreshed)));
        Ok(())
    }

    async fn submit_grades(&self, filter: GradeFilter) -> Result<()> {
        let all = loaded("grades", self.client.grades().settled().await)?;
        let selected: Vec<_> = filter.apply(&all).into_iter().cloned().collect();
        let count = selected.len();
        let ack = self.client.submit_grades(selected).await?;
        if self.json {
            return print_json(&ack);
        }
        println!("{} ({count} grade(s))", ack.message);
        Ok(())
    }

    async fn edit_grade(&self, id: GradeId, new_grade: &str) -> Result<()> {
        let grades = self.client.grades();
        let current = loaded("grades", grades.settled().await)?;
        let Some(grade) = current.into_iter().find(|grade| grade.id == id) else {
            return Err(ApiException::new(ErrorCode::NotFound, format!("grade {id} not found")).into());
        };

        let ack = self.client.update_grade(grade, new_grade).await?;
        grades.refetch().await.context("grade refetch panicked")?;
        let refreshed = loaded("grades", grades.current_state())?;
        if self.json {
            return print_json(&serde_json::json!({ "ack": ack, "grades": refreshed }));
        }
        println!("{}", ack.message);
        let rows: Vec<_> = refreshed.iter().collect();
        print!("{}", render::grades(&rows));
        Ok(())
    }

    fn create_course(&self, draft: CourseDraft) -> Result<()> {
        let ack = self.client.create_course(&draft)?;
        if self.json {
            return print_json(&serde_json::json!({ "ack": ack, "course": draft }));
        }
        println!("{} ({} {})", ack.message, draft.code, draft.name);
        Ok(())
    }

    async fn reports(&self, report_types: &[ReportType]) -> Result<()> {
        let Some((first, rest)) = report_types.split_first() else {
            bail!("no report type given");
        };
        let loader = self.client.report(*first);
        let mut reports = vec![loaded("report", loader.settled().await)?];

        for report_type in rest {
            if let Some(attempt) = loader.observe(*report_type) {
                attempt.await.context("report generation panicked")?;
            }
            reports.push(loaded("report", loader.current_state())?);
        }

        if self.json {
            return print_json(&reports);
        }
        for report in &reports {
            print!("{}", render::report(report));
        }
        Ok(())
    }

    async fn view(&self, view: View) -> Result<()> {
        match view {
            View::Dashboard => self.dashboard().await,
            View::Students => self.students(StudentFilter::default()).await,
            View::Courses => self.courses(CourseFilter::default()).await,
            View::Enrollment => self.enrollments(EnrollmentFilter::default()).await,
            View::Grades => self.grades(GradeFilter::default()).await,
            View::Timetable => self.timetable(TimetableFilter::default(), true).await,
            View::Reports => {
                if self.json {
                    return print_json(ReportType::ALL);
                }
                for report_type in ReportType::ALL {
                    println!("{:<12} {}", report_type.label(), report_type.title());
                }
                Ok(())
            }
        }
    }

    async fn route(&self, controller: &DashboardController, events: &[ControllerEvent]) -> Result<()> {
        if !self.json {
            print!("{}", render::events(events));
            println!();
        }
        self.view(controller.view()).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(filter) = cli.log_filter {
        settings.log_filter = filter;
    }
    if let Some(resource) = cli.fail {
        settings.fail_resource = Some(resource);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let latency = if cli.no_latency {
        portal_api::SimulatedLatency::none()
    } else {
        settings.latency()
    };
    let mut api = MockPortalApi::new(latency);
    if let Some((operation, message)) = settings.failure()? {
        info!(%operation, "backend failure injected");
        api = api.with_failure(operation, message);
    }
    let api: Arc<dyn PortalApi> = Arc::new(api);
    let app = App {
        client: DashboardClient::new(api),
        json: cli.json,
    };

    match cli.command {
        Command::Students {
            search,
            program,
            year,
        } => {
            app.students(StudentFilter {
                search,
                program,
                year,
            })
            .await
        }
        Command::Courses {
            search,
            department,
            semester,
        } => {
            app.courses(CourseFilter {
                search,
                department,
                semester,
            })
            .await
        }
        Command::Enrollments { status } => app.enrollments(EnrollmentFilter { status }).await,
        Command::Grades { course, status } => {
            app.grades(GradeFilter {
                course_code: course,
                status,
            })
            .await
        }
        Command::Timetable {
            day,
            room,
            conflicts,
        } => app.timetable(TimetableFilter { day, room }, conflicts).await,
        Command::Alerts { dismiss } => app.alerts(&dismiss).await,
        Command::Dashboard => app.dashboard().await,
        Command::UpdateEnrollment { id, status, reason } => {
            app.update_enrollment(EnrollmentId(id), status, reason).await
        }
        Command::SubmitGrades { course, status } => {
            app.submit_grades(GradeFilter {
                course_code: course,
                status,
            })
            .await
        }
        Command::EditGrade { id, grade } => app.edit_grade(GradeId(id), &grade).await,
        Command::CreateCourse {
            code,
            name,
            instructor,
            capacity,
            department,
            semester,
            credits,
        } => {
            let defaults = CourseDraft::default();
            app.create_course(CourseDraft {
                code,
                name,
                instructor,
                capacity: capacity.unwrap_or(defaults.capacity),
                department: department.unwrap_or(defaults.department),
                semester: semester.unwrap_or(defaults.semester),
                credits: credits.unwrap_or(defaults.credits),
                ..CourseDraft::default()
            })
        }
        Command::Report { report_types } => app.reports(&report_types).await,
        Command::QuickAction { action } => {
            let mut controller = DashboardController::new();
            let events = controller.quick_action(action);
            app.route(&controller, &events).await
        }
        Command::Kpi { kpi } => {
            let mut controller = DashboardController::new();
            let events = controller.kpi_selected(kpi);
            app.route(&controller, &events).await
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
