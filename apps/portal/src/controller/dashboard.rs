//! Dashboard screen: curriculum stats and health load on mount, grading on submit.

use client_core::{Completion, RequestError, RequestSlot, Ticket};
use shared::{
    domain::{CurriculumStats, GradeRequest, GradeResult},
    protocol::HealthStatus,
};

use super::{MountScope, SubmitBlocked};
use crate::backend_bridge::commands::BackendCommand;

#[derive(Debug)]
pub struct DashboardScreen {
    scope: MountScope,
    stats: RequestSlot<CurriculumStats>,
    health: RequestSlot<HealthStatus>,
    grading: RequestSlot<GradeResult>,
    answer: String,
    student_id: String,
    unit_name: String,
}

impl DashboardScreen {
    pub fn new(student_id: impl Into<String>, unit_name: impl Into<String>) -> Self {
        Self {
            scope: MountScope::default(),
            stats: RequestSlot::new(),
            health: RequestSlot::new(),
            grading: RequestSlot::new(),
            answer: String::new(),
            student_id: student_id.into(),
            unit_name: unit_name.into(),
        }
    }

    pub fn mount(&mut self) -> Vec<BackendCommand> {
        self.scope.mount();
        let mut commands = Vec::with_capacity(2);
        if let Ok(cmd) = self.reload_stats() {
            commands.push(cmd);
        }
        if let (Ok(ticket), Ok(cancel)) = (self.health.begin(), self.scope.token()) {
            commands.push(BackendCommand::CheckHealth { ticket, cancel });
        }
        commands
    }

    pub fn unmount(&mut self) {
        self.scope.unmount();
        self.stats.reset();
        self.health.reset();
        self.grading.reset();
        self.answer.clear();
    }

    pub fn reload_stats(&mut self) -> Result<BackendCommand, SubmitBlocked> {
        let cancel = self.scope.token()?;
        let ticket = self.stats.begin()?;
        Ok(BackendCommand::LoadCurriculum { ticket, cancel })
    }

    pub fn set_answer(&mut self, answer: impl Into<String>) {
        self.answer = answer.into();
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// The grade button is enabled only with a non-empty answer and no
    /// submission in flight.
    pub fn can_submit(&self) -> bool {
        self.scope.is_mounted() && !self.grading.is_pending() && !self.answer.trim().is_empty()
    }

    pub fn submit_grade(&mut self) -> Result<BackendCommand, SubmitBlocked> {
        if self.answer.trim().is_empty() {
            return Err(SubmitBlocked::EmptyInput);
        }
        let cancel = self.scope.token()?;
        let ticket = self.grading.begin()?;
        let request = GradeRequest {
            student_id: self.student_id.clone(),
            unit_name: self.unit_name.clone(),
            submission_text: self.answer.clone(),
        };
        Ok(BackendCommand::SubmitGrade {
            ticket,
            cancel,
            request,
        })
    }

    pub fn apply_curriculum(
        &mut self,
        ticket: Ticket,
        outcome: Result<CurriculumStats, RequestError>,
    ) -> Completion {
        self.stats.complete(ticket, outcome)
    }

    pub fn apply_health(
        &mut self,
        ticket: Ticket,
        outcome: Result<HealthStatus, RequestError>,
    ) -> Completion {
        self.health.complete(ticket, outcome)
    }

    pub fn apply_grade(
        &mut self,
        ticket: Ticket,
        outcome: Result<GradeResult, RequestError>,
    ) -> Completion {
        self.grading.complete(ticket, outcome)
    }

    pub fn stats(&self) -> &RequestSlot<CurriculumStats> {
        &self.stats
    }

    pub fn health(&self) -> &RequestSlot<HealthStatus> {
        &self.health
    }

    pub fn grading(&self) -> &RequestSlot<GradeResult> {
        &self.grading
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
