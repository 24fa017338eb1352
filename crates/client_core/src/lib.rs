use std::{future::Future, sync::Arc};

use anyhow::Result;
use portal_api::PortalApi;
use shared::{
    domain::{Alert, Course, Enrollment, EnrollmentId, Grade, ReportType, Student, TimetableSlot},
    error::{ApiException, ErrorCode},
    protocol::{Ack, CourseDraft, EnrollmentStatusUpdate, ReportResult},
};
use tracing::info;

pub mod controller;
pub mod loader;
pub mod views;

pub use controller::{ControllerEvent, DashboardController, Kpi, Modal, QuickAction, View};
pub use loader::{LoadPhase, LoadState, Producer, ResourceLoader};

/// Entry point for dashboard consumers: hands out one loader per resource
/// and forwards mutations to the portal backend.
#[derive(Clone)]
pub struct DashboardClient {
    api: Arc<dyn PortalApi>,
}

impl DashboardClient {
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self { api }
    }

    fn attach<T, F, Fut>(&self, fetch: F) -> ResourceLoader<T>
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<dyn PortalApi>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        ResourceLoader::attach(move || fetch(Arc::clone(&api)), ())
    }

    pub fn students(&self) -> ResourceLoader<Vec<Student>> {
        self.attach(|api| async move { api.students().await })
    }

    pub fn courses(&self) -> ResourceLoader<Vec<Course>> {
        self.attach(|api| async move { api.courses().await })
    }

    pub fn enrollments(&self) -> ResourceLoader<Vec<Enrollment>> {
        self.attach(|api| async move { api.enrollments().await })
    }

    pub fn grades(&self) -> ResourceLoader<Vec<Grade>> {
        self.attach(|api| async move { api.grades().await })
    }

    pub fn timetable(&self) -> ResourceLoader<Vec<TimetableSlot>> {
        self.attach(|api| async move { api.timetable().await })
    }

    pub fn alerts(&self) -> ResourceLoader<Vec<Alert>> {
        self.attach(|api| async move { api.alerts().await })
    }

    /// Report loader keyed on the selected report type; observing a
    /// different type regenerates.
    pub fn report(&self, report_type: ReportType) -> ResourceLoader<ReportResult, ReportType> {
        let api = Arc::clone(&self.api);
        ResourceLoader::attach_with(
            move |report_type| {
                let api = Arc::clone(&api);
                async move { api.generate_report(report_type).await }
            },
            report_type,
        )
    }

    pub async fn update_enrollment_status(&self, update: EnrollmentStatusUpdate) -> Result<Ack> {
        self.api.update_enrollment_status(update).await
    }

    /// Approves an enrollment override. The justification is mandatory.
    pub async fn approve_override(&self, enrollment_id: EnrollmentId, reason: &str) -> Result<Ack> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ApiException::new(
                ErrorCode::Validation,
                "override reason must not be empty",
            )
            .into());
        }
        info!(enrollment_id = enrollment_id.0, "approving enrollment override");
        self.api
            .update_enrollment_status(EnrollmentStatusUpdate::override_approval(
                enrollment_id,
                reason,
            ))
            .await
    }

    pub async fn submit_grades(&self, grades: Vec<Grade>) -> Result<Ack> {
        if grades.is_empty() {
            return Err(ApiException::new(ErrorCode::Validation, "no grades selected").into());
        }
        self.api.submit_grades(grades).await
    }

    /// Resubmits a single grade with a new letter value.
    pub async fn update_grade(&self, grade: Grade, new_grade: &str) -> Result<Ack> {
        let new_grade = new_grade.trim();
        if new_grade.is_empty() {
            return Err(ApiException::new(ErrorCode::Validation, "grade must not be empty").into());
        }
        info!(grade_id = grade.id.0, from = %grade.grade, to = new_grade, "updating grade");
        let edited = Grade {
            grade: new_grade.to_string(),
            ..grade
        };
        self.submit_grades(vec![edited]).await?;
        Ok(Ack::ok("Grade updated successfully"))
    }

    /// Validates a new course. The portal has no create endpoint, so a valid
    /// draft is only logged and acknowledged.
    pub fn create_course(&self, draft: &CourseDraft) -> Result<Ack> {
        draft.validate()?;
        info!(code = %draft.code, name = %draft.name, instructor = %draft.instructor, "creating course");
        Ok(Ack::ok("Course created successfully!"))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
