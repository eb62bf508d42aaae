//! Text views. Every function reads controller state and the shell context
//! and returns the rendered text; nothing here mutates state.

use client_core::{RequestSlot, RequestState, Session};
use shared::{
    domain::{
        CurriculumStats, GradeBand, GradeResult, HEADLINE_LEVEL, SLIDES_TYPE, TEXTBOOK_TYPE,
    },
    protocol::TutorReply,
};

use super::{
    i18n::{self, Key},
    shell::{NavShell, Route, ShellContext},
    theme::Accent,
};
use crate::controller::{
    courses::CoursesScreen,
    dashboard::DashboardScreen,
    events::{UiError, UiErrorContext},
    login::LoginScreen,
    tutor::TutorScreen,
};

/// Dashboard tile values. Counts missing from the backend document read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatTiles {
    pub grade12: u64,
    pub textbooks: u64,
    pub slides: u64,
    pub scanned: usize,
}

pub fn stat_tiles(stats: &CurriculumStats) -> StatTiles {
    StatTiles {
        grade12: stats.level_count(HEADLINE_LEVEL),
        textbooks: stats.type_count(TEXTBOOK_TYPE),
        slides: stats.type_count(SLIDES_TYPE),
        scanned: stats.resource_count(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeCard {
    pub title: String,
    pub accent: Accent,
    pub body: String,
}

pub fn grade_card(result: &GradeResult) -> GradeCard {
    let accent = match result.band() {
        GradeBand::Distinction => Accent::Green,
        GradeBand::Merit => Accent::Blue,
        GradeBand::Other => Accent::Yellow,
    };
    GradeCard {
        title: result.grade.clone(),
        accent,
        body: result.ai_feedback.clone(),
    }
}

fn error_line(ctx: &ShellContext, context: UiErrorContext, err: &client_core::RequestError) -> String {
    let headline = UiError::from_request_error(context, err).headline(ctx.language);
    ctx.palette().paint(Accent::Red, &headline)
}

/// Loading for `Idle`/`Pending`, the payload on success, an error line on failure.
fn panel<T>(
    slot: &RequestSlot<T>,
    ctx: &ShellContext,
    context: UiErrorContext,
    render: impl FnOnce(&T) -> Vec<String>,
) -> Vec<String> {
    match slot.state() {
        RequestState::Idle | RequestState::Pending => vec![ctx.text(Key::Loading).to_string()],
        RequestState::Succeeded(value) => render(value),
        RequestState::Failed(err) => vec![error_line(ctx, context, err)],
    }
}

/// Like [`panel`] but an untouched slot renders nothing.
fn on_demand<T>(
    slot: &RequestSlot<T>,
    ctx: &ShellContext,
    context: UiErrorContext,
    render: impl FnOnce(&T) -> Vec<String>,
) -> Vec<String> {
    match slot.state() {
        RequestState::Idle => Vec::new(),
        _ => panel(slot, ctx, context, render),
    }
}

fn heading(ctx: &ShellContext, key: Key) -> String {
    ctx.palette().paint(Accent::Purple, &format!("== {} ==", ctx.text(key)))
}

pub fn render_home(ctx: &ShellContext) -> String {
    [
        heading(ctx, Key::Welcome),
        ctx.text(Key::ExploreCourses).to_string(),
    ]
    .join("\n")
}

pub fn render_login(screen: &LoginScreen, session: Option<&Session>, ctx: &ShellContext) -> String {
    let mut lines = vec![heading(ctx, Key::NavLogin)];
    if let Some(session) = session {
        lines.push(format!("* {}", session.display_name()));
    }
    lines.push(format!("{}: {}", ctx.text(Key::UserId), screen.username()));
    lines.push(format!("{}: ********", ctx.text(Key::AccessKey)));

    let button = if screen.login().is_pending() {
        Key::Connecting
    } else {
        Key::SignIn
    };
    lines.push(format!("[{}]", ctx.text(button)));
    if let Some(err) = screen.login().error() {
        lines.push(error_line(ctx, UiErrorContext::Login, err));
    }
    lines.join("\n")
}

pub fn render_dashboard(screen: &DashboardScreen, ctx: &ShellContext) -> String {
    let palette = ctx.palette();
    let mut lines = vec![heading(ctx, Key::KnowledgeBase)];

    lines.extend(panel(screen.stats(), ctx, UiErrorContext::Dashboard, |stats| {
        let tiles = stat_tiles(stats);
        vec![
            format!(
                "  {}: {}  |  {}: {}  |  {}: {}",
                ctx.text(Key::Grade12Files),
                tiles.grade12,
                ctx.text(Key::Textbooks),
                tiles.textbooks,
                ctx.text(Key::Slides),
                tiles.slides,
            ),
            format!("  {}", i18n::format(ctx.language, Key::ScannedResources, tiles.scanned)),
        ]
    }));

    let badge = match screen.health().state() {
        RequestState::Succeeded(status) if status.is_ok() => {
            palette.paint(Accent::Green, ctx.text(Key::AiOnline))
        }
        RequestState::Idle | RequestState::Pending => ctx.text(Key::Loading).to_string(),
        _ => palette.paint(Accent::Red, ctx.text(Key::AiOffline)),
    };
    lines.push(String::new());
    lines.push(heading(ctx, Key::Assessment));
    lines.push(format!("{}  {badge}", screen.unit_name()));

    if screen.answer().is_empty() {
        lines.push(format!("> {}", ctx.text(Key::AnswerPrompt)));
    } else {
        lines.push(format!("> {}", screen.answer()));
    }

    let button = if screen.grading().is_pending() {
        format!("[{}]", ctx.text(Key::Analyzing))
    } else if screen.can_submit() {
        format!("[{}]", ctx.text(Key::AnalyzeAndGrade))
    } else {
        format!("({})", ctx.text(Key::AnalyzeAndGrade))
    };
    lines.push(button);

    match screen.grading().state() {
        RequestState::Succeeded(result) => {
            let card = grade_card(result);
            lines.push(palette.paint(card.accent, &format!("[{}]", card.title)));
            lines.push(card.body);
        }
        RequestState::Failed(err) => lines.push(error_line(ctx, UiErrorContext::Grading, err)),
        RequestState::Idle | RequestState::Pending => {}
    }
    lines.join("\n")
}

pub fn render_courses(screen: &CoursesScreen, ctx: &ShellContext) -> String {
    let mut lines = vec![heading(ctx, Key::Courses)];
    lines.extend(panel(screen.courses(), ctx, UiErrorContext::Courses, |courses| {
        if courses.is_empty() {
            return vec![ctx.text(Key::NoCourses).to_string()];
        }
        courses
            .iter()
            .map(|course| format!("  #{} {}", course.id.0, course.title))
            .collect()
    }));
    lines.join("\n")
}

fn reply_summary(reply: &TutorReply) -> Vec<String> {
    vec![format!("  {}", reply.summary())]
}

pub fn render_tutor(screen: &TutorScreen, ctx: &ShellContext) -> String {
    let mut lines = vec![heading(ctx, Key::Tutor)];

    lines.push(format!("{}:", ctx.text(Key::Recommendations)));
    lines.extend(panel(
        screen.recommendations(),
        ctx,
        UiErrorContext::Tutor,
        |reply| {
            let items = reply.items();
            if items.is_empty() {
                return reply_summary(reply);
            }
            items.iter().map(|item| format!("  - {item}")).collect()
        },
    ));

    let greeting = on_demand(screen.greeting(), ctx, UiErrorContext::Tutor, reply_summary);
    if !greeting.is_empty() {
        lines.push(format!("{}:", ctx.text(Key::Greeting)));
        lines.extend(greeting);
    }

    let progress = on_demand(screen.progress(), ctx, UiErrorContext::Tutor, reply_summary);
    if !progress.is_empty() {
        lines.push(format!("{}:", ctx.text(Key::Progress)));
        lines.extend(progress);
    }
    lines.join("\n")
}

/// Persistent chrome around the current screen body.
pub fn render_shell(
    shell: &NavShell,
    session: Option<&Session>,
    api_base_url: &str,
    status: &str,
    body: &str,
) -> String {
    let ctx = shell.context();
    let palette = ctx.palette();
    let nav_label = |route: Route| {
        let label = ctx.text(route.label());
        if route == shell.current() {
            palette.paint(Accent::Blue, &format!("[{label}]"))
        } else {
            label.to_string()
        }
    };

    let user = session
        .map(|session| session.display_name().to_string())
        .unwrap_or_else(|| ctx.text(Key::NavLogin).to_string());
    let mut header = vec![palette.paint(Accent::Purple, ctx.text(Key::Brand))];
    if !shell.menu_open() {
        header.push(Route::NAV.iter().map(|route| nav_label(*route)).collect::<Vec<_>>().join("  "));
    }
    header.push(format!(
        "{} {} | {} | {user}",
        ctx.theme.toggle_icon(),
        ctx.theme,
        ctx.language
    ));

    let mut lines = vec![header.join(" | ")];
    if shell.menu_open() {
        lines.extend(Route::NAV.iter().map(|route| format!("  {}", nav_label(*route))));
    }
    lines.push(format!("@ {api_base_url}"));
    lines.push(String::new());
    lines.push(body.to_string());
    if !status.is_empty() {
        lines.push(String::new());
        lines.push(format!("-- {status}"));
    }

    let frame = lines.join("\n");
    if ctx.language.is_rtl() {
        // Right-to-left mark at the start of each line.
        return frame
            .lines()
            .map(|line| format!("\u{200f}{line}"))
            .collect::<Vec<_>>()
            .join("\n");
    }
    frame
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
