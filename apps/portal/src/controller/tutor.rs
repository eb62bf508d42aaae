//! Virtual tutor: greeting, recommendations (loaded on mount) and progress records.

use client_core::{Completion, RequestError, RequestSlot, Ticket};
use shared::{
    domain::StudentId,
    protocol::{ProgressRequest, TutorReply},
};

use super::{MountScope, SubmitBlocked};
use crate::backend_bridge::commands::BackendCommand;

#[derive(Debug, Default)]
pub struct TutorScreen {
    scope: MountScope,
    student_id: Option<StudentId>,
    greeting: RequestSlot<TutorReply>,
    recommendations: RequestSlot<TutorReply>,
    progress: RequestSlot<TutorReply>,
}

impl TutorScreen {
    pub fn new(student_id: Option<StudentId>) -> Self {
        Self {
            student_id,
            ..Self::default()
        }
    }

    pub fn mount(&mut self) -> Option<BackendCommand> {
        self.scope.mount();
        self.recommend(self.student_id).ok()
    }

    pub fn unmount(&mut self) {
        self.scope.unmount();
        self.greeting.reset();
        self.recommendations.reset();
        self.progress.reset();
    }

    pub fn student_id(&self) -> Option<StudentId> {
        self.student_id
    }

    pub fn greet(&mut self, name: &str) -> Result<BackendCommand, SubmitBlocked> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SubmitBlocked::EmptyInput);
        }
        let cancel = self.scope.token()?;
        let ticket = self.greeting.begin()?;
        Ok(BackendCommand::Greet {
            ticket,
            cancel,
            name: name.to_string(),
        })
    }

    /// Passing a student id also makes it the default for later requests.
    pub fn recommend(&mut self, student_id: Option<StudentId>) -> Result<BackendCommand, SubmitBlocked> {
        let cancel = self.scope.token()?;
        let ticket = self.recommendations.begin()?;
        if student_id.is_some() {
            self.student_id = student_id;
        }
        Ok(BackendCommand::Recommend {
            ticket,
            cancel,
            student_id: self.student_id,
        })
    }

    pub fn record_progress(
        &mut self,
        student_id: StudentId,
        course: &str,
        progress: f64,
    ) -> Result<BackendCommand, SubmitBlocked> {
        let course = course.trim();
        if course.is_empty() {
            return Err(SubmitBlocked::EmptyInput);
        }
        if !(0.0..=100.0).contains(&progress) {
            return Err(SubmitBlocked::OutOfRange);
        }
        let cancel = self.scope.token()?;
        let ticket = self.progress.begin()?;
        Ok(BackendCommand::RecordProgress {
            ticket,
            cancel,
            request: ProgressRequest {
                student_id,
                course: course.to_string(),
                progress,
            },
        })
    }

    pub fn apply_greeting(&mut self, ticket: Ticket, outcome: Result<TutorReply, RequestError>) -> Completion {
        self.greeting.complete(ticket, outcome)
    }

    pub fn apply_recommendations(
        &mut self,
        ticket: Ticket,
        outcome: Result<TutorReply, RequestError>,
    ) -> Completion {
        self.recommendations.complete(ticket, outcome)
    }

    pub fn apply_progress(&mut self, ticket: Ticket, outcome: Result<TutorReply, RequestError>) -> Completion {
        self.progress.complete(ticket, outcome)
    }

    pub fn greeting(&self) -> &RequestSlot<TutorReply> {
        &self.greeting
    }

    pub fn recommendations(&self) -> &RequestSlot<TutorReply> {
        &self.recommendations
    }

    pub fn progress(&self) -> &RequestSlot<TutorReply> {
        &self.progress
    }
}
