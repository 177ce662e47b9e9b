//! 🏗 Infrastructure shared by the reservation backend, its HTTP front and the
//! clients: domain types, request plumbing, errors and configuration.
#![warn(missing_docs)]

mod config;
mod error;
mod model;
mod request;

pub use config::{AdminAccount, Config, ResetPolicy, MAX_CODE_WIDTH};
pub use error::{ConfigError, ServiceError, UnknownVariant};
pub use model::{
    Claim, ClaimOutcome, ClaimShot, ClaimStatus, ClaimStatusUpdate, Credentials, EventSettings,
    Inventory, InventoryRow, Item, SessionGrant, SessionInfo, MAX_NAME_CHARS,
};
pub use request::{RawRequest, Request, RequestHandler, RequestKind, RequestMethod};

/// Name of the HTTP header carrying the admin session token
pub const SESSION_HEADER: &str = "X-Session-Id";
