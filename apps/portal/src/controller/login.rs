//! Login screen: credentials form backed by `POST /token`.

use client_core::{Completion, RequestError, RequestSlot, Session, Ticket};

use super::{MountScope, SubmitBlocked};
use crate::backend_bridge::commands::BackendCommand;

#[derive(Debug, Default)]
pub struct LoginScreen {
    scope: MountScope,
    login: RequestSlot<Session>,
    username: String,
}

impl LoginScreen {
    pub fn mount(&mut self) {
        self.scope.mount();
    }

    pub fn unmount(&mut self) {
        self.scope.unmount();
        self.login.reset();
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn submit(&mut self, username: &str, password: &str) -> Result<BackendCommand, SubmitBlocked> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(SubmitBlocked::EmptyInput);
        }
        let cancel = self.scope.token()?;
        let ticket = self.login.begin()?;
        self.username = username.to_string();
        Ok(BackendCommand::Login {
            ticket,
            cancel,
            username: self.username.clone(),
            password: password.to_string(),
        })
    }

    /// Returns the session when this completion signed the user in.
    pub fn apply_login(
        &mut self,
        ticket: Ticket,
        outcome: Result<Session, RequestError>,
    ) -> Option<Session> {
        match self.login.complete(ticket, outcome) {
            Completion::Applied => self.login.value().cloned(),
            Completion::Discarded => None,
        }
    }

    pub fn login(&self) -> &RequestSlot<Session> {
        &self.login
    }
}
