//! Backend commands queued from UI to backend worker.

use client_core::{CancellationToken, RequestError, Ticket};
use shared::{
    domain::{GradeRequest, StudentId},
    protocol::ProgressRequest,
};

use crate::controller::events::BackendReply;

pub enum BackendCommand {
    LoadCurriculum {
        ticket: Ticket,
        cancel: CancellationToken,
    },
    CheckHealth {
        ticket: Ticket,
        cancel: CancellationToken,
    },
    SubmitGrade {
        ticket: Ticket,
        cancel: CancellationToken,
        request: GradeRequest,
    },
    Login {
        ticket: Ticket,
        cancel: CancellationToken,
        username: String,
        password: String,
    },
    Logout,
    ListCourses {
        ticket: Ticket,
        cancel: CancellationToken,
    },
    Greet {
        ticket: Ticket,
        cancel: CancellationToken,
        name: String,
    },
    Recommend {
        ticket: Ticket,
        cancel: CancellationToken,
        student_id: Option<StudentId>,
    },
    RecordProgress {
        ticket: Ticket,
        cancel: CancellationToken,
        request: ProgressRequest,
    },
    SetBaseUrl {
        url: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadCurriculum { .. } => "load_curriculum",
            Self::CheckHealth { .. } => "check_health",
            Self::SubmitGrade { .. } => "submit_grade",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::ListCourses { .. } => "list_courses",
            Self::Greet { .. } => "greet",
            Self::Recommend { .. } => "recommend",
            Self::RecordProgress { .. } => "record_progress",
            Self::SetBaseUrl { .. } => "set_base_url",
        }
    }

    /// The reply a command resolves to when it never reaches the backend.
    /// Commands without a request slot have none.
    pub fn failed_reply(self, err: RequestError) -> Option<BackendReply> {
        let reply = match self {
            Self::LoadCurriculum { ticket, .. } => BackendReply::Curriculum { ticket, outcome: Err(err) },
            Self::CheckHealth { ticket, .. } => BackendReply::Health { ticket, outcome: Err(err) },
            Self::SubmitGrade { ticket, .. } => BackendReply::Grade { ticket, outcome: Err(err) },
            Self::Login { ticket, .. } => BackendReply::Login { ticket, outcome: Err(err) },
            Self::ListCourses { ticket, .. } => BackendReply::Courses { ticket, outcome: Err(err) },
            Self::Greet { ticket, .. } => BackendReply::Greeting { ticket, outcome: Err(err) },
            Self::Recommend { ticket, .. } => BackendReply::Recommendations { ticket, outcome: Err(err) },
            Self::RecordProgress { ticket, .. } => BackendReply::Progress { ticket, outcome: Err(err) },
            Self::Logout | Self::SetBaseUrl { .. } => return None,
        };
        Some(reply)
    }
}
