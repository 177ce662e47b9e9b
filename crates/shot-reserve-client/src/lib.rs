//! Thin clients of the reservation backend.
//!
//! [`PublicView`] is the attendee page, [`AdminConsole`] the staff page. Both
//! only hold display state and talk to the backend through a [`Backend`].
#![warn(missing_docs)]

mod admin;
mod api;
mod backend;
mod error;
mod poller;
mod public;

pub use admin::AdminConsole;
pub use api::Api;
pub use backend::{Backend, LocalBackend};
pub use error::ClientError;
pub use poller::{Poller, POLL_INTERVAL};
pub use public::PublicView;
