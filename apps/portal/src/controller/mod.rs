//! Controller layer: UI events, per-screen request lifecycles, and command orchestration.

pub mod actions;
pub mod courses;
pub mod dashboard;
pub mod events;
pub mod login;
pub mod orchestration;
pub mod tutor;

use client_core::{CancellationToken, LifecycleError};
use thiserror::Error;

/// Why a user action did not produce a backend command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("nothing to submit")]
    EmptyInput,
    #[error("a request is already in flight")]
    AlreadyPending,
    #[error("value out of range")]
    OutOfRange,
    #[error("screen is not mounted")]
    NotMounted,
}

impl From<LifecycleError> for SubmitBlocked {
    fn from(value: LifecycleError) -> Self {
        match value {
            LifecycleError::AlreadyPending => Self::AlreadyPending,
        }
    }
}

/// Lifetime of one screen mount. Commands issued while mounted carry a clone
/// of the token; unmounting cancels all of them at once.
#[derive(Debug, Default)]
pub struct MountScope {
    token: CancellationToken,
    mounted: bool,
}

impl MountScope {
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.token = CancellationToken::new();
        self.mounted = true;
    }

    pub fn unmount(&mut self) {
        self.token.cancel();
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn token(&self) -> Result<CancellationToken, SubmitBlocked> {
        if !self.mounted {
            return Err(SubmitBlocked::NotMounted);
        }
        Ok(self.token.clone())
    }
}
