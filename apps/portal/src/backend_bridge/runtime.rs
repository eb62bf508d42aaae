//! Runtime bridge between the UI command queue and backend event intake.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use client_core::BackendApi;
use crossbeam_channel::{Receiver, Sender};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{BackendReply, UiError, UiErrorCategory, UiErrorContext, UiEvent},
};

/// Spawns the backend worker thread. It owns a tokio runtime, runs each
/// request command as its own task, and exits once every command sender is
/// dropped.
pub fn launch(
    api: Arc<dyn BackendApi>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("backend-bridge".into())
        .spawn(move || run(api, cmd_rx, ui_tx))
}

fn run(api: Arc<dyn BackendApi>, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("backend-io")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            emit(
                &ui_tx,
                UiEvent::Error(UiError::new(
                    UiErrorCategory::Unknown,
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )),
            );
            tracing::error!("failed to build backend runtime: {err}");
            return;
        }
    };
    tracing::info!(base_url = %api.base_url(), "backend worker ready");

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            // Handled in order so later commands already see the new state.
            BackendCommand::SetBaseUrl { url } => match api.set_base_url(&url) {
                Ok(()) => emit(&ui_tx, UiEvent::BaseUrlChanged(api.base_url().to_string())),
                Err(err) => {
                    tracing::warn!(url = %url, error = %err, "rejected base url override");
                    emit(
                        &ui_tx,
                        UiEvent::Error(UiError::from_request_error(UiErrorContext::Settings, &err)),
                    );
                }
            },
            BackendCommand::Logout => api.logout(),
            cmd => {
                let api = Arc::clone(&api);
                let ui_tx = ui_tx.clone();
                runtime.spawn(async move {
                    if let Some(reply) = execute(api.as_ref(), cmd).await {
                        deliver(ui_tx, UiEvent::Reply(reply)).await;
                    }
                });
            }
        }
    }

    tracing::info!("backend command queue closed; stopping worker");
    runtime.shutdown_timeout(Duration::from_secs(1));
}

/// Runs one request command. Returns `None` when the issuing screen was
/// unmounted meanwhile; its slot has already moved on.
async fn execute(api: &dyn BackendApi, cmd: BackendCommand) -> Option<BackendReply> {
    let name = cmd.name();
    tracing::debug!(command = name, "backend: executing");
    let (cancel, reply) = match cmd {
        BackendCommand::LoadCurriculum { ticket, cancel } => {
            let outcome = api.curriculum_stats(&cancel).await;
            (cancel, BackendReply::Curriculum { ticket, outcome })
        }
        BackendCommand::CheckHealth { ticket, cancel } => {
            let outcome = api.health(&cancel).await;
            (cancel, BackendReply::Health { ticket, outcome })
        }
        BackendCommand::SubmitGrade {
            ticket,
            cancel,
            request,
        } => {
            let outcome = api.grade_submission(&request, &cancel).await;
            (cancel, BackendReply::Grade { ticket, outcome })
        }
        BackendCommand::Login {
            ticket,
            cancel,
            username,
            password,
        } => {
            let outcome = api.login(&username, &password, &cancel).await;
            if cancel.is_cancelled() && outcome.is_ok() {
                // Nobody will mirror this session; do not keep sending its token.
                tracing::info!("backend: discarding session from abandoned login");
                api.logout();
            }
            (cancel, BackendReply::Login { ticket, outcome })
        }
        BackendCommand::ListCourses { ticket, cancel } => {
            let outcome = api.list_courses(&cancel).await;
            (cancel, BackendReply::Courses { ticket, outcome })
        }
        BackendCommand::Greet {
            ticket,
            cancel,
            name,
        } => {
            let outcome = api.greet_student(&name, &cancel).await;
            (cancel, BackendReply::Greeting { ticket, outcome })
        }
        BackendCommand::Recommend {
            ticket,
            cancel,
            student_id,
        } => {
            let outcome = api.recommendations(student_id, &cancel).await;
            (cancel, BackendReply::Recommendations { ticket, outcome })
        }
        BackendCommand::RecordProgress {
            ticket,
            cancel,
            request,
        } => {
            let outcome = api.record_progress(&request, &cancel).await;
            (cancel, BackendReply::Progress { ticket, outcome })
        }
        BackendCommand::SetBaseUrl { .. } | BackendCommand::Logout => return None,
    };

    if cancel.is_cancelled() {
        tracing::debug!(command = name, "backend: dropping result of cancelled command");
        return None;
    }
    Some(reply)
}

/// Waits for queue space: a dropped reply would leave its slot pending forever.
async fn deliver(ui_tx: Sender<UiEvent>, event: UiEvent) {
    let sent = tokio::task::spawn_blocking(move || ui_tx.send(event)).await;
    if !matches!(sent, Ok(Ok(()))) {
        tracing::warn!("ui event queue closed; dropping backend reply");
    }
}

fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.try_send(event).is_err() {
        tracing::warn!("ui event queue unavailable; dropping backend event");
    }
}
