//! Navigation shell: routes, persistent chrome state, and the shell context
//! every view reads theme and language from.

use std::{fmt, str::FromStr};

use super::{
    i18n::{Key, Language},
    theme::{Palette, Theme},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    Courses,
    Tutor,
}

impl Route {
    pub const NAV: [Route; 5] = [
        Route::Home,
        Route::Login,
        Route::Dashboard,
        Route::Courses,
        Route::Tutor,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Courses => "/courses",
            Self::Tutor => "/tutor",
        }
    }

    pub fn label(self) -> Key {
        match self {
            Self::Home => Key::NavHome,
            Self::Login => Key::NavLogin,
            Self::Dashboard => Key::NavDashboard,
            Self::Courses => Key::NavCourses,
            Self::Tutor => Key::NavTutor,
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Self::Dashboard | Self::Tutor)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.trim().trim_start_matches('/').to_ascii_lowercase();
        match name.as_str() {
            "" | "home" => Ok(Self::Home),
            "login" => Ok(Self::Login),
            "dashboard" => Ok(Self::Dashboard),
            "courses" => Ok(Self::Courses),
            "tutor" | "virtual-tutor" => Ok(Self::Tutor),
            other => Err(format!("unknown route '{other}'")),
        }
    }
}

/// Process-wide presentation context. Created once at startup and handed to
/// views by shared reference; only the shell changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellContext {
    pub theme: Theme,
    pub language: Language,
    pub color: bool,
}

impl ShellContext {
    pub fn palette(&self) -> Palette {
        Palette {
            theme: self.theme,
            color: self.color,
        }
    }

    pub fn text(&self, key: Key) -> &'static str {
        super::i18n::text(self.language, key)
    }
}

#[derive(Debug)]
pub struct NavShell {
    current: Route,
    menu_open: bool,
    context: ShellContext,
    guard_routes: bool,
    return_to: Option<Route>,
}

impl NavShell {
    pub fn new(context: ShellContext, guard_routes: bool) -> Self {
        Self {
            current: Route::Home,
            menu_open: false,
            context,
            guard_routes,
            return_to: None,
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn context(&self) -> &ShellContext {
        &self.context
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    /// Where a navigation to `target` actually lands. With guarding on,
    /// protected routes bounce to the login screen and are remembered.
    pub fn resolve(&mut self, target: Route, authenticated: bool) -> Route {
        if self.guard_routes && target.is_protected() && !authenticated {
            self.return_to = Some(target);
            return Route::Login;
        }
        target
    }

    /// Leaving for anywhere but the login screen abandons the pending return.
    pub fn enter(&mut self, route: Route) {
        if route != Route::Login {
            self.return_to = None;
        }
        self.current = route;
        self.menu_open = false;
    }

    /// Destination after a successful sign-in.
    pub fn after_login(&mut self) -> Route {
        self.return_to.take().unwrap_or(Route::Dashboard)
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    pub fn toggle_theme(&mut self) {
        self.context.theme = self.context.theme.toggled();
    }

    pub fn set_language(&mut self, language: Language) {
        self.context.language = language;
    }
}
