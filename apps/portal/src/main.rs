use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{ApiClient, BackendApi};
use crossbeam_channel::{bounded, select};
use portal::{
    backend_bridge::runtime,
    controller::{actions::UiAction, events::UiEvent},
    ui::{i18n::Language, shell::Route, theme::Theme},
    Flow, PortalApp,
};
use tracing_subscriber::EnvFilter;

/// Terminal front end for the MetaLearn learning platform.
#[derive(Parser, Debug)]
#[command(name = "portal", version)]
struct Args {
    /// Config file; defaults to ./portal.toml or the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backend base URL, overriding config and environment.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    lang: Option<Language>,
    #[arg(long)]
    theme: Option<Theme>,
    #[arg(long)]
    no_color: bool,
    /// Redirect protected routes to the login screen without a session.
    #[arg(long)]
    guard_routes: bool,
    /// Screen to open at startup.
    #[arg(long, default_value = "home")]
    route: Route,
}

enum Input {
    Line(String),
    Event(UiEvent),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = portal::load_settings(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    if let Some(lang) = args.lang {
        settings.language = lang;
    }
    if let Some(theme) = args.theme {
        settings.theme = theme;
    }
    if args.no_color {
        settings.color = false;
    }
    if args.guard_routes {
        settings.guard_routes = true;
    }

    let api = ApiClient::with_policy(&settings.api_base_url, settings.request_policy())
        .with_context(|| format!("invalid backend url '{}'", settings.api_base_url))?;
    let api: Arc<dyn BackendApi> = Arc::new(api);
    tracing::info!(
        base_url = %api.base_url(),
        timeout_ms = settings.request_timeout.as_millis() as u64,
        retry_attempts = settings.retry.max_attempts,
        "portal configured"
    );

    let (cmd_tx, cmd_rx) = bounded(64);
    let (ui_tx, ui_rx) = bounded(256);
    let bridge = runtime::launch(api, cmd_rx, ui_tx).context("failed to spawn backend worker")?;

    let (input_tx, input_rx) = bounded::<String>(16);
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if input_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::error!("failed to read stdin: {err}");
                        break;
                    }
                }
            }
        })
        .context("failed to spawn input reader")?;

    let mut app = PortalApp::new(&settings, cmd_tx);
    app.start(args.route);
    draw(&app)?;

    loop {
        let next = select! {
            recv(input_rx) -> line => line.map(Input::Line),
            recv(ui_rx) -> event => event.map(Input::Event),
        };
        match next {
            Ok(Input::Line(line)) if line.trim().is_empty() => {}
            Ok(Input::Line(line)) => match UiAction::parse(&line) {
                Ok(action) => {
                    if app.handle_action(action) == Flow::Quit {
                        break;
                    }
                }
                Err(message) => app.handle_event(UiEvent::Info(message)),
            },
            Ok(Input::Event(event)) => {
                app.handle_event(event);
                for event in ui_rx.try_iter() {
                    app.handle_event(event);
                }
            }
            // stdin closed or worker gone
            Err(_) => break,
        }
        draw(&app)?;
    }

    // Dropping the app closes the command queue and lets the worker wind down.
    drop(app);
    if bridge.join().is_err() {
        tracing::warn!("backend worker panicked during shutdown");
    }
    Ok(())
}

fn draw(app: &PortalApp) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "\n{}", app.render())?;
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}
