//! Command orchestration helpers from UI actions to backend command queue.

use client_core::RequestError;
use crossbeam_channel::{Sender, TrySendError};

use crate::{backend_bridge::commands::BackendCommand, controller::events::BackendReply};

/// Queues `cmd` for the backend worker. When the queue refuses it, `Err`
/// carries the command's own failure reply (if it has one) so the issuing
/// slot can leave `Pending` instead of spinning forever.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> Result<(), Option<BackendReply>> {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(cmd)) => {
            *status = "UI command queue is full; please retry".to_string();
            tracing::warn!(command = cmd_name, "backend command queue full");
            Err(cmd.failed_reply(RequestError::Network("command queue full".into())))
        }
        Err(TrySendError::Disconnected(cmd)) => {
            *status = "Backend command processor disconnected; restart the portal".to_string();
            tracing::error!(command = cmd_name, "backend command processor disconnected");
            Err(cmd.failed_reply(RequestError::Network("backend worker unavailable".into())))
        }
    }
}

#[cfg(test)]
mod tests {
    use client_core::{CancellationToken, RequestSlot};
    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn disconnected_worker_fails_the_command() {
        let (cmd_tx, cmd_rx) = bounded(1);
        drop(cmd_rx);
        let mut slot = RequestSlot::<Vec<shared::domain::Course>>::new();
        let ticket = slot.begin().expect("begin");
        let mut status = String::new();

        let reply = dispatch_backend_command(
            &cmd_tx,
            BackendCommand::ListCourses {
                ticket,
                cancel: CancellationToken::new(),
            },
            &mut status,
        );

        match reply {
            Err(Some(BackendReply::Courses { ticket, outcome })) => {
                slot.complete(ticket, outcome);
            }
            _ => panic!("expected failed course reply"),
        }
        assert!(slot.error().is_some());
        assert!(status.contains("disconnected"));
    }

    #[test]
    fn queued_command_has_no_immediate_reply() {
        let (cmd_tx, cmd_rx) = bounded(1);
        let mut status = String::new();
        let queued = dispatch_backend_command(&cmd_tx, BackendCommand::Logout, &mut status);
        assert!(queued.is_ok());
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::Logout)));
        assert!(status.is_empty());
    }

    #[test]
    fn refused_logout_is_reported_without_a_reply() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&cmd_tx, BackendCommand::Logout, &mut status).is_ok());

        let refused = dispatch_backend_command(&cmd_tx, BackendCommand::Logout, &mut status);
        assert!(matches!(refused, Err(None)));
        assert_eq!(status, "UI command queue is full; please retry");
    }
}
