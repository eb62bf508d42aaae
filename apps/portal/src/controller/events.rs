//! Backend->UI events and user-facing error classification.

use client_core::{RequestError, RequestErrorKind, Session, Ticket};
use shared::{
    domain::{Course, CurriculumStats, GradeResult},
    protocol::{HealthStatus, TutorReply},
};

use crate::ui::i18n::{self, Key, Language};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    BaseUrlChanged(String),
    Reply(BackendReply),
}

/// Completion of one backend command, tagged with the ticket it was issued under.
pub enum BackendReply {
    Curriculum {
        ticket: Ticket,
        outcome: Result<CurriculumStats, RequestError>,
    },
    Health {
        ticket: Ticket,
        outcome: Result<HealthStatus, RequestError>,
    },
    Grade {
        ticket: Ticket,
        outcome: Result<GradeResult, RequestError>,
    },
    Login {
        ticket: Ticket,
        outcome: Result<Session, RequestError>,
    },
    Courses {
        ticket: Ticket,
        outcome: Result<Vec<Course>, RequestError>,
    },
    Greeting {
        ticket: Ticket,
        outcome: Result<TutorReply, RequestError>,
    },
    Recommendations {
        ticket: Ticket,
        outcome: Result<TutorReply, RequestError>,
    },
    Progress {
        ticket: Ticket,
        outcome: Result<TutorReply, RequestError>,
    },
}

impl BackendReply {
    pub fn error(&self) -> Option<&RequestError> {
        match self {
            Self::Curriculum { outcome, .. } => outcome.as_ref().err(),
            Self::Health { outcome, .. } => outcome.as_ref().err(),
            Self::Grade { outcome, .. } => outcome.as_ref().err(),
            Self::Login { outcome, .. } => outcome.as_ref().err(),
            Self::Courses { outcome, .. } => outcome.as_ref().err(),
            Self::Greeting { outcome, .. } => outcome.as_ref().err(),
            Self::Recommendations { outcome, .. } => outcome.as_ref().err(),
            Self::Progress { outcome, .. } => outcome.as_ref().err(),
        }
    }

    pub fn context(&self) -> UiErrorContext {
        match self {
            Self::Curriculum { .. } | Self::Health { .. } => UiErrorContext::Dashboard,
            Self::Grade { .. } => UiErrorContext::Grading,
            Self::Login { .. } => UiErrorContext::Login,
            Self::Courses { .. } => UiErrorContext::Courses,
            Self::Greeting { .. } | Self::Recommendations { .. } | Self::Progress { .. } => {
                UiErrorContext::Tutor
            }
        }
    }

    /// A rejected bearer token on any call other than the login itself.
    pub fn session_rejected(&self) -> Option<UiError> {
        if matches!(self, Self::Login { .. }) {
            return None;
        }
        let err = UiError::from_request_error(self.context(), self.error()?);
        err.requires_reauth().then_some(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Server,
    Protocol,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Login,
    Dashboard,
    Grading,
    Courses,
    Tutor,
    Settings,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(category: UiErrorCategory, context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    /// "Backend down" and "request rejected" get different categories so the
    /// view can tell them apart.
    pub fn from_request_error(context: UiErrorContext, err: &RequestError) -> Self {
        let category = match err.kind() {
            RequestErrorKind::Network | RequestErrorKind::Timeout => UiErrorCategory::Transport,
            RequestErrorKind::Http => match err.status() {
                Some(401 | 403) => UiErrorCategory::Auth,
                Some(status) if (400..500).contains(&status) => UiErrorCategory::Validation,
                Some(502..=504) => UiErrorCategory::Transport,
                _ => UiErrorCategory::Server,
            },
            RequestErrorKind::Parse => UiErrorCategory::Protocol,
            RequestErrorKind::InvalidUrl | RequestErrorKind::Encode => UiErrorCategory::Validation,
            RequestErrorKind::Cancelled => UiErrorCategory::Unknown,
        };
        let message = err.detail().unwrap_or_else(|| err.to_string());
        Self::new(category, context, message)
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Headline shown in the failed panel. Validation errors show the
    /// backend's own explanation next to it.
    pub fn headline(&self, language: Language) -> String {
        let key = match self.category {
            UiErrorCategory::Transport => Key::ConnectionFailed,
            UiErrorCategory::Auth => Key::SessionExpired,
            UiErrorCategory::Validation => Key::RequestRejected,
            UiErrorCategory::Server => Key::ServerError,
            UiErrorCategory::Protocol => Key::UnexpectedResponse,
            UiErrorCategory::Unknown => Key::ConnectionFailed,
        };
        let headline = i18n::text(language, key);
        match self.category {
            UiErrorCategory::Validation | UiErrorCategory::Server if !self.message.is_empty() => {
                format!("{headline}: {}", self.message)
            }
            _ => headline.to_string(),
        }
    }
}
