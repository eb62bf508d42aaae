//! Course listing, loaded on mount.

use client_core::{Completion, RequestError, RequestSlot, Ticket};
use shared::domain::Course;

use super::{MountScope, SubmitBlocked};
use crate::backend_bridge::commands::BackendCommand;

#[derive(Debug, Default)]
pub struct CoursesScreen {
    scope: MountScope,
    courses: RequestSlot<Vec<Course>>,
}

impl CoursesScreen {
    pub fn mount(&mut self) -> Option<BackendCommand> {
        self.scope.mount();
        self.reload().ok()
    }

    pub fn unmount(&mut self) {
        self.scope.unmount();
        self.courses.reset();
    }

    pub fn reload(&mut self) -> Result<BackendCommand, SubmitBlocked> {
        let cancel = self.scope.token()?;
        let ticket = self.courses.begin()?;
        Ok(BackendCommand::ListCourses { ticket, cancel })
    }

    pub fn apply_courses(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<Course>, RequestError>,
    ) -> Completion {
        self.courses.complete(ticket, outcome)
    }

    pub fn courses(&self) -> &RequestSlot<Vec<Course>> {
        &self.courses
    }
}
