//! Types shared between the portal front end and the backend client.

pub mod domain;
pub mod error;
pub mod protocol;
