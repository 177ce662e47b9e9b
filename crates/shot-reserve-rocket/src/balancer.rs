//! Implementation of the request balancer
use parking_lot::Mutex;
use serde::Deserialize;
use shot_reserve_core::{
    ClaimShot, ClaimStatusUpdate, Credentials, EventSettings, InventoryRow, Item, Request,
    RequestHandler, RequestKind, ServiceError, SessionInfo,
};
use tracing::{debug, info, warn};

use crate::auth::Auth;
use crate::database::Database;

/// Inventory overwrite as sent by the admin console
///
/// Counts arrive as plain integers so that negative input is reported as
/// invalid rather than as a parse failure.
#[derive(Deserialize)]
struct InventoryUpdate {
    item: Item,
    remaining: i64,
}

impl TryFrom<InventoryUpdate> for InventoryRow {
    type Error = ServiceError;

    fn try_from(update: InventoryUpdate) -> Result<Self, Self::Error> {
        let remaining = u32::try_from(update.remaining).map_err(|_| {
            ServiceError::Invalid(format!(
                "Remaining count for {} must be between 0 and {}.",
                update.item,
                u32::MAX
            ))
        })?;
        Ok(InventoryRow {
            item: update.item,
            remaining,
        })
    }
}

/// Implementation of the request balancer
///
/// ⚠️ This struct implements the [`RequestHandler`] trait and is exposed from
/// the crate root (to be used from the server and the tester as
/// `shot_reserve_rocket::Balancer`).
pub struct Balancer {
    database: Mutex<Database>,
    auth: Auth,
}

impl Balancer {
    /// Create a new [`Balancer`]
    pub fn new(database: Database, auth: Auth) -> Self {
        Self {
            database: Mutex::new(database),
            auth,
        }
    }

    fn set_inventory(&self, rq: &mut Request) -> Result<Vec<InventoryRow>, ServiceError> {
        let updates: Vec<InventoryUpdate> = rq.read_json()?;
        let rows = updates
            .into_iter()
            .map(InventoryRow::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let mut database = self.database.lock();
        database.set_inventory(&rows);
        Ok(database.inventory().rows())
    }
}

impl RequestHandler for Balancer {
    fn handle(&self, mut rq: Request) {
        let kind = *rq.kind();
        debug!(?kind, url = rq.url(), "handling request");

        if kind.requires_session() {
            if let Err(err) = self.auth.verify(rq.session_id()) {
                warn!(?kind, "rejected request without a valid session");
                rq.respond_with_err(err);
                return;
            }
        }

        match kind {
            RequestKind::GetSettings => {
                let settings = self.database.lock().settings().clone();
                rq.respond_with_json(&settings);
            }
            RequestKind::GetInventory => {
                let rows = self.database.lock().inventory().rows();
                rq.respond_with_json(&rows);
            }
            RequestKind::ClaimShot => match rq.read_json::<ClaimShot>() {
                Ok(claim) => {
                    let outcome = self.database.lock().claim(&claim.name, claim.item);
                    rq.respond_with_json(&outcome);
                }
                Err(err) => rq.respond_with_err(err),
            },
            RequestKind::SignIn => {
                let result = rq
                    .read_json::<Credentials>()
                    .and_then(|creds| self.auth.sign_in(&creds));
                rq.respond_with_result(result);
            }
            RequestKind::SignOut => {
                if let Some(session) = rq.session_id() {
                    self.auth.sign_out(session);
                }
                rq.respond_with_empty();
            }
            RequestKind::GetSession => {
                let result = self
                    .auth
                    .verify(rq.session_id())
                    .map(|email| SessionInfo { email });
                rq.respond_with_result(result);
            }
            RequestKind::UpdateSettings => match rq.read_json::<EventSettings>() {
                Ok(settings) => {
                    let settings = {
                        let mut database = self.database.lock();
                        database.update_settings(settings);
                        database.settings().clone()
                    };
                    rq.respond_with_json(&settings);
                }
                Err(err) => rq.respond_with_err(err),
            },
            RequestKind::SetInventory => {
                let result = self.set_inventory(&mut rq);
                rq.respond_with_result(result);
            }
            RequestKind::ListClaims => {
                let claims = self.database.lock().claims();
                rq.respond_with_json(&claims);
            }
            RequestKind::SetClaimStatus => {
                let result = rq
                    .read_json::<ClaimStatusUpdate>()
                    .and_then(|u| self.database.lock().set_claim_status(u.id, u.status));
                rq.respond_with_result(result);
            }
            RequestKind::ResetClaims => {
                self.database.lock().reset();
                rq.respond_with_empty();
            }
            RequestKind::Debug => {
                let summary = {
                    let database = self.database.lock();
                    let inventory = database.inventory();
                    format!(
                        "claims: {}, habu: {}, tequila: {}, open: {}, sessions: {}",
                        database.claims().len(),
                        inventory.habu,
                        inventory.tequila,
                        database.settings().is_open,
                        self.auth.session_count(),
                    )
                };
                rq.respond_with_string(summary);
            }
        }
    }

    fn shutdown(self) {
        let database = self.database.into_inner();
        info!(
            claims = database.claims().len(),
            habu = database.inventory().habu,
            tequila = database.inventory().tequila,
            "reservation system shut down"
        );
    }
}
