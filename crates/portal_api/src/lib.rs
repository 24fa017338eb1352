use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{Alert, Course, Enrollment, Grade, ReportType, Student, TimetableSlot},
    error::{ApiException, ErrorCode},
    protocol::{Ack, EnrollmentStatusUpdate, ReportResult},
};
use thiserror::Error;
use tracing::{debug, info};

pub mod fixtures;

pub const DEFAULT_LIST_LATENCY: Duration = Duration::from_millis(500);
pub const DEFAULT_UPDATE_LATENCY: Duration = Duration::from_millis(300);
pub const DEFAULT_SUBMIT_LATENCY: Duration = Duration::from_millis(500);
pub const DEFAULT_REPORT_LATENCY: Duration = Duration::from_millis(1000);

/// Every call the portal backend offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Students,
    Courses,
    Enrollments,
    Grades,
    Timetable,
    Alerts,
    UpdateEnrollmentStatus,
    SubmitGrades,
    GenerateReport,
}

impl Operation {
    pub const ALL: &'static [Operation] = &[
        Operation::Students,
        Operation::Courses,
        Operation::Enrollments,
        Operation::Grades,
        Operation::Timetable,
        Operation::Alerts,
        Operation::UpdateEnrollmentStatus,
        Operation::SubmitGrades,
        Operation::GenerateReport,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Students => "students",
            Operation::Courses => "courses",
            Operation::Enrollments => "enrollments",
            Operation::Grades => "grades",
            Operation::Timetable => "timetable",
            Operation::Alerts => "alerts",
            Operation::UpdateEnrollmentStatus => "update_enrollment_status",
            Operation::SubmitGrades => "submit_grades",
            Operation::GenerateReport => "generate_report",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = PortalApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().replace('-', "_");
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(&needle))
            .ok_or_else(|| PortalApiError::UnknownOperation(s.trim().to_string()))
    }
}

#[derive(Debug, Error)]
pub enum PortalApiError {
    #[error("failed to decode {fixture} fixture: {source}")]
    Fixture {
        fixture: &'static str,
        source: serde_json::Error,
    },
    #[error("unknown portal operation '{0}'")]
    UnknownOperation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    pub list: Duration,
    pub update: Duration,
    pub submit: Duration,
    pub report: Duration,
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self {
            list: DEFAULT_LIST_LATENCY,
            update: DEFAULT_UPDATE_LATENCY,
            submit: DEFAULT_SUBMIT_LATENCY,
            report: DEFAULT_REPORT_LATENCY,
        }
    }
}

impl SimulatedLatency {
    pub fn none() -> Self {
        Self {
            list: Duration::ZERO,
            update: Duration::ZERO,
            submit: Duration::ZERO,
            report: Duration::ZERO,
        }
    }

    fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::UpdateEnrollmentStatus => self.update,
            Operation::SubmitGrades => self.submit,
            Operation::GenerateReport => self.report,
            _ => self.list,
        }
    }
}

/// Data source behind every dashboard view.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn students(&self) -> Result<Vec<Student>>;
    async fn courses(&self) -> Result<Vec<Course>>;
    async fn enrollments(&self) -> Result<Vec<Enrollment>>;
    async fn grades(&self) -> Result<Vec<Grade>>;
    async fn timetable(&self) -> Result<Vec<TimetableSlot>>;
    async fn alerts(&self) -> Result<Vec<Alert>>;
    async fn update_enrollment_status(&self, update: EnrollmentStatusUpdate) -> Result<Ack>;
    async fn submit_grades(&self, grades: Vec<Grade>) -> Result<Ack>;
    async fn generate_report(&self, report_type: ReportType) -> Result<ReportResult>;
}

/// In-memory backend: serves the embedded fixtures after a fixed delay.
///
/// Mutations are acknowledged and logged but never change the fixtures.
pub struct MockPortalApi {
    latency: SimulatedLatency,
    failures: HashMap<Operation, String>,
    calls: AtomicUsize,
}

impl Default for MockPortalApi {
    fn default() -> Self {
        Self::new(SimulatedLatency::default())
    }
}

impl MockPortalApi {
    pub fn new(latency: SimulatedLatency) -> Self {
        Self {
            latency,
            failures: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Makes `operation` fail with `message` on every call.
    pub fn with_failure(mut self, operation: Operation, message: impl Into<String>) -> Self {
        self.failures.insert(operation, message.into());
        self
    }

    pub fn latency(&self) -> SimulatedLatency {
        self.latency
    }

    /// Total calls served, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    async fn simulate(&self, operation: Operation) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let delay = self.latency.for_operation(operation);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        debug!(operation = operation.name(), ?delay, "mock portal call");

        if let Some(message) = self.failures.get(&operation) {
            return Err(ApiException::new(ErrorCode::Unavailable, message.clone()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl PortalApi for MockPortalApi {
    async fn students(&self) -> Result<Vec<Student>> {
        self.simulate(Operation::Students).await?;
        Ok(fixtures::students()?)
    }

    async fn courses(&self) -> Result<Vec<Course>> {
        self.simulate(Operation::Courses).await?;
        Ok(fixtures::courses()?)
    }

    async fn enrollments(&self) -> Result<Vec<Enrollment>> {
        self.simulate(Operation::Enrollments).await?;
        Ok(fixtures::enrollments()?)
    }

    async fn grades(&self) -> Result<Vec<Grade>> {
        self.simulate(Operation::Grades).await?;
        Ok(fixtures::grades()?)
    }

    async fn timetable(&self) -> Result<Vec<TimetableSlot>> {
        self.simulate(Operation::Timetable).await?;
        Ok(fixtures::timetable()?)
    }

    async fn alerts(&self) -> Result<Vec<Alert>> {
        self.simulate(Operation::Alerts).await?;
        Ok(fixtures::alerts()?)
    }

    async fn update_enrollment_status(&self, update: EnrollmentStatusUpdate) -> Result<Ack> {
        self.simulate(Operation::UpdateEnrollmentStatus).await?;
        info!(
            enrollment_id = update.enrollment_id.0,
            status = %update.status,
            reason = update.reason.as_deref().unwrap_or(""),
            "enrollment status updated"
        );
        Ok(Ack::ok("Enrollment status updated successfully"))
    }

    async fn submit_grades(&self, grades: Vec<Grade>) -> Result<Ack> {
        self.simulate(Operation::SubmitGrades).await?;
        let ids: Vec<i64> = grades.iter().map(|grade| grade.id.0).collect();
        info!(count = grades.len(), ?ids, "grades submitted");
        Ok(Ack::ok("Grades submitted successfully"))
    }

    async fn generate_report(&self, report_type: ReportType) -> Result<ReportResult> {
        self.simulate(Operation::GenerateReport).await?;
        info!(report = report_type.label(), "report generated");
        Ok(ReportResult {
            success: true,
            report_type,
            data: format!("Report data for {}", report_type.label()),
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
