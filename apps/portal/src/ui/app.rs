//! The UI loop state: navigation shell, every screen controller, and the
//! command queue to the backend bridge. Only this type mutates screen state.

use client_core::Session;
use crossbeam_channel::Sender;
use shared::domain::StudentId;

use super::{
    shell::{NavShell, Route, ShellContext},
    views,
};
use crate::{
    backend_bridge::commands::BackendCommand,
    config::Settings,
    controller::{
        actions::{UiAction, HELP},
        courses::CoursesScreen,
        dashboard::DashboardScreen,
        events::{BackendReply, UiError, UiEvent},
        login::LoginScreen,
        orchestration::dispatch_backend_command,
        tutor::TutorScreen,
        SubmitBlocked,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct PortalApp {
    shell: NavShell,
    login: LoginScreen,
    dashboard: DashboardScreen,
    courses: CoursesScreen,
    tutor: TutorScreen,
    session: Option<Session>,
    api_base_url: String,
    status: String,
    cmd_tx: Sender<BackendCommand>,
}

impl PortalApp {
    pub fn new(settings: &Settings, cmd_tx: Sender<BackendCommand>) -> Self {
        let context = ShellContext {
            theme: settings.theme,
            language: settings.language,
            color: settings.color,
        };
        Self {
            shell: NavShell::new(context, settings.guard_routes),
            login: LoginScreen::default(),
            dashboard: DashboardScreen::new(&settings.student_id, &settings.unit_name),
            courses: CoursesScreen::default(),
            tutor: TutorScreen::new(settings.tutor_student_id.map(StudentId)),
            session: None,
            api_base_url: settings.api_base_url.clone(),
            status: String::new(),
            cmd_tx,
        }
    }

    pub fn start(&mut self, route: Route) {
        tracing::info!(route = %route, "portal starting");
        self.navigate(route);
    }

    pub fn shell(&self) -> &NavShell {
        &self.shell
    }

    pub fn dashboard(&self) -> &DashboardScreen {
        &self.dashboard
    }

    pub fn courses(&self) -> &CoursesScreen {
        &self.courses
    }

    pub fn tutor(&self) -> &TutorScreen {
        &self.tutor
    }

    pub fn login(&self) -> &LoginScreen {
        &self.login
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Unmounts the current screen, applies route guarding, and mounts the
    /// destination. Re-entering the current route remounts it.
    pub fn navigate(&mut self, target: Route) {
        self.unmount_current();
        let route = self.shell.resolve(target, self.session.is_some());
        if route != target {
            tracing::debug!(from = %target, to = %route, "route guarded");
        }
        self.shell.enter(route);

        let commands = match route {
            Route::Home => Vec::new(),
            Route::Login => {
                self.login.mount();
                Vec::new()
            }
            Route::Dashboard => self.dashboard.mount(),
            Route::Courses => self.courses.mount().into_iter().collect(),
            Route::Tutor => self.tutor.mount().into_iter().collect(),
        };
        for cmd in commands {
            self.dispatch(cmd);
        }
    }

    fn unmount_current(&mut self) {
        match self.shell.current() {
            Route::Home => {}
            Route::Login => self.login.unmount(),
            Route::Dashboard => self.dashboard.unmount(),
            Route::Courses => self.courses.unmount(),
            Route::Tutor => self.tutor.unmount(),
        }
    }

    fn ensure_route(&mut self, route: Route) {
        if self.shell.current() != route {
            self.navigate(route);
        }
    }

    /// Returns whether the worker accepted the command.
    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        match dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            Ok(()) => true,
            Err(reply) => {
                if let Some(reply) = reply {
                    self.apply_reply(reply);
                }
                false
            }
        }
    }

    fn issue(&mut self, label: &str, outcome: Result<BackendCommand, SubmitBlocked>) {
        match outcome {
            Ok(cmd) => {
                self.dispatch(cmd);
            }
            Err(blocked) => {
                tracing::debug!(action = label, reason = %blocked, "action blocked");
                self.status = format!("{label}: {blocked}");
            }
        }
    }

    pub fn handle_action(&mut self, action: UiAction) -> Flow {
        match action {
            UiAction::Navigate(route) => self.navigate(route),
            UiAction::Login { username, password } => {
                self.ensure_route(Route::Login);
                let outcome = self.login.submit(&username, &password);
                self.issue("login", outcome);
            }
            UiAction::SetAnswer(answer) => {
                self.ensure_route(Route::Dashboard);
                self.dashboard.set_answer(answer);
            }
            UiAction::SubmitGrade => {
                self.ensure_route(Route::Dashboard);
                let outcome = self.dashboard.submit_grade();
                self.issue("grade", outcome);
            }
            UiAction::Grade(answer) => {
                self.ensure_route(Route::Dashboard);
                // Editing is locked while a submission is in flight.
                if !self.dashboard.grading().is_pending() {
                    self.dashboard.set_answer(answer);
                }
                let outcome = self.dashboard.submit_grade();
                self.issue("grade", outcome);
            }
            UiAction::Greet(name) => {
                self.ensure_route(Route::Tutor);
                let outcome = self.tutor.greet(&name);
                self.issue("greet", outcome);
            }
            UiAction::Recommend(student_id) => {
                self.ensure_route(Route::Tutor);
                let outcome = self.tutor.recommend(student_id);
                self.issue("recommend", outcome);
            }
            UiAction::Progress {
                student_id,
                course,
                progress,
            } => {
                self.ensure_route(Route::Tutor);
                let outcome = self.tutor.record_progress(student_id, &course, progress);
                self.issue("progress", outcome);
            }
            UiAction::Reload => self.reload(),
            UiAction::ToggleTheme => self.shell.toggle_theme(),
            UiAction::SetLanguage(language) => self.shell.set_language(language),
            UiAction::ToggleMenu => self.shell.toggle_menu(),
            UiAction::SetApiUrl(url) => {
                self.status = format!("switching backend to {url}");
                self.dispatch(BackendCommand::SetBaseUrl { url });
            }
            UiAction::Logout => self.logout(),
            UiAction::Help => self.status = HELP.to_string(),
            UiAction::Quit => {
                self.unmount_current();
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    fn reload(&mut self) {
        let outcome = match self.shell.current() {
            Route::Dashboard => self.dashboard.reload_stats(),
            Route::Courses => self.courses.reload(),
            Route::Tutor => self.tutor.recommend(None),
            Route::Home | Route::Login => return,
        };
        self.issue("reload", outcome);
    }

    /// The mirror is only dropped once the client is sure to forget the
    /// token too; a refused logout leaves the user signed in.
    fn logout(&mut self) {
        if !self.dispatch(BackendCommand::Logout) {
            tracing::warn!("logout not delivered; session kept");
            return;
        }
        if let Some(session) = self.session.take() {
            tracing::info!(user = session.display_name(), "signed out");
        }
        self.status = "signed out".to_string();
        self.navigate(Route::Home);
    }

    fn expire_session(&mut self, err: &UiError) {
        if let Some(session) = self.session.take() {
            tracing::info!(user = session.display_name(), context = ?err.context(), "session rejected by backend");
            self.dispatch(BackendCommand::Logout);
        }
        self.status = err.headline(self.shell.context().language);
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => self.status = message,
            UiEvent::Error(err) => {
                tracing::warn!(context = ?err.context(), category = ?err.category(), "{}", err.message());
                if err.requires_reauth() {
                    self.expire_session(&err);
                } else {
                    self.status = err.headline(self.shell.context().language);
                }
            }
            UiEvent::BaseUrlChanged(url) => {
                self.status = format!("backend set to {url}");
                self.api_base_url = url;
            }
            UiEvent::Reply(reply) => self.apply_reply(reply),
        }
    }

    fn apply_reply(&mut self, reply: BackendReply) {
        if let Some(err) = reply.session_rejected() {
            self.expire_session(&err);
        }
        match reply {
            BackendReply::Curriculum { ticket, outcome } => {
                self.dashboard.apply_curriculum(ticket, outcome);
            }
            BackendReply::Health { ticket, outcome } => {
                self.dashboard.apply_health(ticket, outcome);
            }
            BackendReply::Grade { ticket, outcome } => {
                self.dashboard.apply_grade(ticket, outcome);
            }
            BackendReply::Login { ticket, outcome } => {
                if let Some(session) = self.login.apply_login(ticket, outcome) {
                    self.status = format!("signed in as {}", session.display_name());
                    self.session = Some(session);
                    let next = self.shell.after_login();
                    self.navigate(next);
                }
            }
            BackendReply::Courses { ticket, outcome } => {
                self.courses.apply_courses(ticket, outcome);
            }
            BackendReply::Greeting { ticket, outcome } => {
                self.tutor.apply_greeting(ticket, outcome);
            }
            BackendReply::Recommendations { ticket, outcome } => {
                self.tutor.apply_recommendations(ticket, outcome);
            }
            BackendReply::Progress { ticket, outcome } => {
                self.tutor.apply_progress(ticket, outcome);
            }
        }
    }

    pub fn render(&self) -> String {
        let ctx = self.shell.context();
        let body = match self.shell.current() {
            Route::Home => views::render_home(ctx),
            Route::Login => views::render_login(&self.login, self.session.as_ref(), ctx),
            Route::Dashboard => views::render_dashboard(&self.dashboard, ctx),
            Route::Courses => views::render_courses(&self.courses, ctx),
            Route::Tutor => views::render_tutor(&self.tutor, ctx),
        };
        views::render_shell(
            &self.shell,
            self.session.as_ref(),
            &self.api_base_url,
            &self.status,
            &body,
        )
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
