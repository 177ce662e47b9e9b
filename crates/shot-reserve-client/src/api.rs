//! Typed calls on top of a [`Backend`]

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shot_reserve_core::{
    Claim, ClaimOutcome, ClaimShot, ClaimStatus, ClaimStatusUpdate, Credentials, EventSettings,
    Inventory, InventoryRow, Item, RequestKind, SessionGrant, SessionInfo,
};
use tracing::warn;
use uuid::Uuid;

use crate::{Backend, ClientError};

/// Inventory row as it comes off the wire, before validation
#[derive(Deserialize)]
struct RawInventoryRow {
    item: String,
    remaining: Option<i64>,
}

/// Claim row as it comes off the wire, before validation
#[derive(Deserialize)]
struct RawClaimRow {
    id: u64,
    claim_code: String,
    name: String,
    item: String,
    status: String,
    created_at: DateTime<Utc>,
}

/// Fold raw rows into an [`Inventory`]
///
/// Rows naming an unknown item or carrying no usable count are logged and
/// skipped; the affected item then reads as 0.
fn coerce_inventory(rows: Vec<RawInventoryRow>) -> Inventory {
    let mut inventory = Inventory::default();
    for row in rows {
        let item = match row.item.parse::<Item>() {
            Ok(item) => item,
            Err(e) => {
                warn!("skipping inventory row: {e}");
                continue;
            }
        };
        match row.remaining.map(u32::try_from) {
            Some(Ok(remaining)) => *inventory.get_mut(item) = remaining,
            Some(Err(_)) | None => {
                warn!(%item, remaining = ?row.remaining, "skipping inventory row with bad count")
            }
        }
    }
    inventory
}

fn coerce_claims(rows: Vec<RawClaimRow>) -> Vec<Claim> {
    rows.into_iter()
        .filter_map(|row| {
            let item = row.item.parse::<Item>();
            let status = row.status.parse::<ClaimStatus>();
            match (item, status) {
                (Ok(item), Ok(status)) => Some(Claim {
                    id: row.id,
                    claim_code: row.claim_code,
                    name: row.name,
                    item,
                    status,
                    created_at: row.created_at,
                }),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(id = row.id, "skipping claim row: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Typed access to the backend
pub struct Api<B> {
    backend: B,
}

impl<B: Backend> Api<B> {
    /// Wrap a backend
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn call<T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        session: Option<Uuid>,
        payload: Option<&impl Serialize>,
    ) -> Result<T, ClientError> {
        let body = payload.map(serde_json::to_string).transpose()?;
        let response = self.backend.send(kind, session, body)?;
        Ok(serde_json::from_str(&response)?)
    }

    fn call_empty(
        &self,
        kind: RequestKind,
        session: Option<Uuid>,
        payload: Option<&impl Serialize>,
    ) -> Result<(), ClientError> {
        let body = payload.map(serde_json::to_string).transpose()?;
        self.backend.send(kind, session, body)?;
        Ok(())
    }

    /// Read the event settings
    pub fn settings(&self) -> Result<EventSettings, ClientError> {
        self.call(RequestKind::GetSettings, None, None::<&()>)
    }

    /// Read the remaining stock
    pub fn inventory(&self) -> Result<Inventory, ClientError> {
        let rows: Vec<RawInventoryRow> = self.call(RequestKind::GetInventory, None, None::<&()>)?;
        Ok(coerce_inventory(rows))
    }

    /// Attempt to claim one unit of `item`
    pub fn claim_shot(&self, name: &str, item: Item) -> Result<ClaimOutcome, ClientError> {
        let payload = ClaimShot {
            name: name.to_owned(),
            item,
        };
        self.call(RequestKind::ClaimShot, None, Some(&payload))
    }

    /// Open an admin session
    pub fn sign_in(&self, credentials: &Credentials) -> Result<SessionGrant, ClientError> {
        self.call(RequestKind::SignIn, None, Some(credentials))
    }

    /// Revoke an admin session
    pub fn sign_out(&self, session: Uuid) -> Result<(), ClientError> {
        self.call_empty(RequestKind::SignOut, Some(session), None::<&()>)
    }

    /// Tell who owns `session`
    pub fn session(&self, session: Uuid) -> Result<SessionInfo, ClientError> {
        self.call(RequestKind::GetSession, Some(session), None::<&()>)
    }

    /// Overwrite the event settings
    pub fn update_settings(
        &self,
        session: Uuid,
        settings: &EventSettings,
    ) -> Result<EventSettings, ClientError> {
        self.call(RequestKind::UpdateSettings, Some(session), Some(settings))
    }

    /// Overwrite the remaining counts
    pub fn set_inventory(&self, session: Uuid, rows: &[InventoryRow]) -> Result<(), ClientError> {
        self.call_empty(RequestKind::SetInventory, Some(session), Some(&rows))
    }

    /// List all claims in creation order
    pub fn claims(&self, session: Uuid) -> Result<Vec<Claim>, ClientError> {
        let rows: Vec<RawClaimRow> = self.call(RequestKind::ListClaims, Some(session), None::<&()>)?;
        Ok(coerce_claims(rows))
    }

    /// Change the status of one claim
    pub fn set_claim_status(
        &self,
        session: Uuid,
        id: u64,
        status: ClaimStatus,
    ) -> Result<(), ClientError> {
        let payload = ClaimStatusUpdate { id, status };
        self.call_empty(RequestKind::SetClaimStatus, Some(session), Some(&payload))
    }

    /// Delete all claims and restart code sequencing
    pub fn reset_claims(&self, session: Uuid) -> Result<(), ClientError> {
        self.call_empty(RequestKind::ResetClaims, Some(session), None::<&()>)
    }
}
