//! Dashboard controller: which view is active and which modal, if any, is
//! open. Every transition reports what happened as a [`ControllerEvent`].

use std::{fmt, str::FromStr};

use shared::domain::{CourseId, EnrollmentId, GradeId, StudentId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Dashboard,
    Students,
    Courses,
    Enrollment,
    Grades,
    Timetable,
    Reports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    StudentDetails(StudentId),
    EnrollmentOverride(EnrollmentId),
    GradeEdit(GradeId),
    TimetableConflicts,
    CreateCourse,
    EditCourse(CourseId),
    Announcement,
}

impl Modal {
    /// View the modal belongs to. `None` for modals that float over any view.
    pub fn home_view(self) -> Option<View> {
        match self {
            Modal::StudentDetails(_) => Some(View::Students),
            Modal::EnrollmentOverride(_) => Some(View::Enrollment),
            Modal::GradeEdit(_) => Some(View::Grades),
            Modal::TimetableConflicts => Some(View::Timetable),
            Modal::CreateCourse | Modal::EditCourse(_) => Some(View::Courses),
            Modal::Announcement => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    CreateCourse,
    OpenEnrollment,
    RunGraduationAudit,
    PublishAnnouncement,
    SyncCalendar,
    GenerateReports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kpi {
    TotalStudents,
    ActiveCourses,
    SeatsFilled,
    WaitlistSize,
    PendingOverrides,
    UpcomingExams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Navigated { from: View, to: View },
    ModalOpened(Modal),
    ModalClosed(Modal),
    Notice(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! named {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().replace(['_', ' '], "-");
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(&needle))
                    .ok_or_else(|| UnknownName {
                        kind: $kind,
                        value: s.trim().to_string(),
                    })
            }
        }
    };
}

named!(View, "view", {
    Dashboard => "dashboard",
    Students => "students",
    Courses => "courses",
    Enrollment => "enrollment",
    Grades => "grades",
    Timetable => "timetable",
    Reports => "reports",
});

named!(QuickAction, "quick action", {
    CreateCourse => "create-course",
    OpenEnrollment => "open-enrollment",
    RunGraduationAudit => "run-graduation-audit",
    PublishAnnouncement => "publish-announcement",
    SyncCalendar => "sync-calendar",
    GenerateReports => "generate-reports",
});

named!(Kpi, "kpi", {
    TotalStudents => "total-students",
    ActiveCourses => "active-courses",
    SeatsFilled => "seats-filled",
    WaitlistSize => "waitlist-size",
    PendingOverrides => "pending-overrides",
    UpcomingExams => "upcoming-exams",
});

impl QuickAction {
    pub fn title(self) -> &'static str {
        match self {
            QuickAction::CreateCourse => "Create Course",
            QuickAction::OpenEnrollment => "Open Enrollment",
            QuickAction::RunGraduationAudit => "Run Graduation Audit",
            QuickAction::PublishAnnouncement => "Publish Announcement",
            QuickAction::SyncCalendar => "Sync Calendar",
            QuickAction::GenerateReports => "Generate Reports",
        }
    }
}

impl Kpi {
    pub fn title(self) -> &'static str {
        match self {
            Kpi::TotalStudents => "Total Students",
            Kpi::ActiveCourses => "Active Courses",
            Kpi::SeatsFilled => "Seats Filled",
            Kpi::WaitlistSize => "Waitlist Size",
            Kpi::PendingOverrides => "Pending Overrides",
            Kpi::UpcomingExams => "Upcoming Exams",
        }
    }
}

#[derive(Debug, Default)]
pub struct DashboardController {
    view: View,
    modal: Option<Modal>,
}

impl DashboardController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn modal(&self) -> Option<Modal> {
        self.modal
    }

    /// Switches view, closing any open modal first.
    pub fn navigate(&mut self, to: View) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        if to == self.view {
            return events;
        }
        if let Some(modal) = self.modal.take() {
            events.push(ControllerEvent::ModalClosed(modal));
        }
        let from = std::mem::replace(&mut self.view, to);
        tracing::debug!(%from, %to, "dashboard view changed");
        events.push(ControllerEvent::Navigated { from, to });
        events
    }

    /// Opens `modal`, navigating to its home view when needed. Replaces any
    /// modal already open.
    pub fn open_modal(&mut self, modal: Modal) -> Vec<ControllerEvent> {
        let mut events = match modal.home_view() {
            Some(view) => self.navigate(view),
            None => Vec::new(),
        };
        if let Some(previous) = self.modal.replace(modal) {
            events.push(ControllerEvent::ModalClosed(previous));
        }
        events.push(ControllerEvent::ModalOpened(modal));
        events
    }

    pub fn close_modal(&mut self) -> Option<ControllerEvent> {
        self.modal.take().map(ControllerEvent::ModalClosed)
    }

    pub fn quick_action(&mut self, action: QuickAction) -> Vec<ControllerEvent> {
        let mut events = vec![ControllerEvent::Notice(format!(
            "Action triggered: {}",
            action.title()
        ))];
        match action {
            QuickAction::CreateCourse | QuickAction::OpenEnrollment => {
                events.extend(self.navigate(View::Enrollment));
            }
            QuickAction::RunGraduationAudit | QuickAction::GenerateReports => {
                events.extend(self.navigate(View::Reports));
            }
            QuickAction::SyncCalendar => events.extend(self.navigate(View::Timetable)),
            QuickAction::PublishAnnouncement => {
                events.extend(self.open_modal(Modal::Announcement));
            }
        }
        events
    }

    pub fn kpi_selected(&mut self, kpi: Kpi) -> Vec<ControllerEvent> {
        let mut events = vec![ControllerEvent::Notice(format!(
            "Viewing details for: {}",
            kpi.title()
        ))];
        match kpi {
            Kpi::TotalStudents => events.extend(self.navigate(View::Students)),
            Kpi::PendingOverrides => events.extend(self.navigate(View::Enrollment)),
            Kpi::UpcomingExams => events.extend(self.navigate(View::Timetable)),
            Kpi::ActiveCourses | Kpi::SeatsFilled | Kpi::WaitlistSize => {}
        }
        events
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
