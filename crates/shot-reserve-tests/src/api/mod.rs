use std::sync::Arc;

use eyre::{eyre, Result};
use flume::Sender;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shot_reserve_core::{
    Claim, ClaimOutcome, ClaimShot, ClaimStatus, ClaimStatusUpdate, Credentials, EventSettings,
    Inventory, InventoryRow, Item, RequestKind, SessionGrant, SessionInfo,
};
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

pub mod mock;

#[derive(Debug, Error)]
#[error("Error {status}: {msg}")]
pub struct ApiError {
    pub status: u16,
    pub msg: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum Response {
    Error { status: u16, msg: String },
    Json(String),
    Text(String),
    Empty,
}

struct RequestMsg {
    kind: RequestKind,
    payload: Option<String>,
    session: Option<Uuid>,
    response_channel: oneshot::Sender<Response>,
}

pub struct Api {
    /// One channel per balancer thread
    channels: Arc<Vec<Sender<RequestMsg>>>,

    my_channel: Sender<RequestMsg>,
    my_index: usize,
}

impl Api {
    fn new(channels: Vec<Sender<RequestMsg>>) -> Self {
        let my_channel = channels[0].clone();
        Self {
            channels: Arc::new(channels),
            my_channel,
            my_index: 0,
        }
    }
}

impl Clone for Api {
    fn clone(&self) -> Self {
        let my_index = (self.my_index + 1) % self.channels.len();
        Self {
            channels: self.channels.clone(),
            my_channel: self.channels[my_index].clone(),
            my_index,
        }
    }
}

fn encode<T: Serialize>(payload: &T) -> Option<String> {
    Some(serde_json::to_string(payload).expect("payload must serialize"))
}

impl Api {
    async fn make_request(
        &self,
        kind: RequestKind,
        payload: Option<String>,
        session: Option<Uuid>,
    ) -> Result<Response> {
        let (sender, receiver) = oneshot::channel();
        let msg = RequestMsg {
            kind,
            payload,
            session,
            response_channel: sender,
        };
        self.my_channel.send_async(msg).await?;
        Ok(receiver.await?)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        payload: Option<String>,
        session: Option<Uuid>,
    ) -> Result<ApiResult<T>> {
        Ok(match self.make_request(kind, payload, session).await? {
            Response::Error { status, msg } => Err(ApiError { status, msg }),
            Response::Json(body) => Ok(serde_json::from_str(&body)?),
            resp => panic!("{kind:?} must not be answered by {resp:?}"),
        })
    }

    async fn request_empty(
        &self,
        kind: RequestKind,
        payload: Option<String>,
        session: Option<Uuid>,
    ) -> Result<ApiResult<()>> {
        Ok(match self.make_request(kind, payload, session).await? {
            Response::Error { status, msg } => Err(ApiError { status, msg }),
            Response::Empty => Ok(()),
            resp => panic!("{kind:?} must not be answered by {resp:?}"),
        })
    }

    pub async fn get_settings(&self) -> Result<ApiResult<EventSettings>> {
        self.request(RequestKind::GetSettings, None, None).await
    }

    pub async fn get_inventory(&self) -> Result<ApiResult<Inventory>> {
        let rows: ApiResult<Vec<InventoryRow>> =
            self.request(RequestKind::GetInventory, None, None).await?;
        Ok(rows.map(|rows| {
            let mut inventory = Inventory::default();
            for row in rows {
                *inventory.get_mut(row.item) = row.remaining;
            }
            inventory
        }))
    }

    pub async fn claim_shot(&self, name: &str, item: Item) -> Result<ApiResult<ClaimOutcome>> {
        let payload = encode(&ClaimShot {
            name: name.to_owned(),
            item,
        });
        self.request(RequestKind::ClaimShot, payload, None).await
    }

    /// Send a claim with a hand-written body
    pub async fn claim_shot_raw(&self, body: &str) -> Result<ApiResult<ClaimOutcome>> {
        self.request(RequestKind::ClaimShot, Some(body.to_owned()), None)
            .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<ApiResult<SessionGrant>> {
        let payload = encode(&Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
        });
        self.request(RequestKind::SignIn, payload, None).await
    }

    pub async fn get_session(&self, session: Option<Uuid>) -> Result<ApiResult<SessionInfo>> {
        self.request(RequestKind::GetSession, None, session).await
    }

    pub async fn sign_out(&self, session: Option<Uuid>) -> Result<ApiResult<()>> {
        self.request_empty(RequestKind::SignOut, None, session)
            .await
    }

    pub async fn update_settings(
        &self,
        settings: &EventSettings,
        session: Option<Uuid>,
    ) -> Result<ApiResult<EventSettings>> {
        self.request(RequestKind::UpdateSettings, encode(settings), session)
            .await
    }

    /// Overwrite inventory; the body is sent as given so that invalid counts
    /// can be exercised
    pub async fn set_inventory_raw(
        &self,
        body: &str,
        session: Option<Uuid>,
    ) -> Result<ApiResult<Vec<InventoryRow>>> {
        self.request(RequestKind::SetInventory, Some(body.to_owned()), session)
            .await
    }

    pub async fn list_claims(&self, session: Option<Uuid>) -> Result<ApiResult<Vec<Claim>>> {
        self.request(RequestKind::ListClaims, None, session).await
    }

    pub async fn set_claim_status(
        &self,
        id: u64,
        status: ClaimStatus,
        session: Option<Uuid>,
    ) -> Result<ApiResult<Claim>> {
        let payload = encode(&ClaimStatusUpdate { id, status });
        self.request(RequestKind::SetClaimStatus, payload, session)
            .await
    }

    pub async fn reset_claims(&self, session: Option<Uuid>) -> Result<ApiResult<()>> {
        self.request_empty(RequestKind::ResetClaims, None, session)
            .await
    }

    pub async fn debug(&self) -> Result<String> {
        match self.make_request(RequestKind::Debug, None, None).await? {
            Response::Text(s) => Ok(s),
            resp => Err(eyre!("Debug must be answered with text, got {resp:?}")),
        }
    }

    /// Sign in and return a handle carrying the session
    pub async fn create_admin_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminSession<'_>> {
        let grant = self.sign_in(email, password).await??;
        Ok(AdminSession {
            api: self,
            session_id: grant.session_id,
            email: grant.email,
        })
    }
}

pub struct AdminSession<'a> {
    pub api: &'a Api,
    pub session_id: Uuid,
    pub email: String,
}

impl<'a> AdminSession<'a> {
    fn session(&self) -> Option<Uuid> {
        Some(self.session_id)
    }

    pub async fn update_settings(
        &self,
        settings: &EventSettings,
    ) -> Result<ApiResult<EventSettings>> {
        self.api.update_settings(settings, self.session()).await
    }

    /// Open or close the event, keeping time and location
    pub async fn set_open(&self, is_open: bool) -> Result<ApiResult<EventSettings>> {
        let mut settings = self.api.get_settings().await??;
        settings.is_open = is_open;
        self.update_settings(&settings).await
    }

    pub async fn set_inventory(&self, habu: u32, tequila: u32) -> Result<ApiResult<Inventory>> {
        let body = serde_json::to_string(&Inventory { habu, tequila }.rows())?;
        let rows = self.api.set_inventory_raw(&body, self.session()).await?;
        Ok(rows.map(|rows| {
            let mut inventory = Inventory::default();
            for row in rows {
                *inventory.get_mut(row.item) = row.remaining;
            }
            inventory
        }))
    }

    pub async fn list_claims(&self) -> Result<ApiResult<Vec<Claim>>> {
        self.api.list_claims(self.session()).await
    }

    pub async fn set_claim_status(&self, id: u64, status: ClaimStatus) -> Result<ApiResult<Claim>> {
        self.api.set_claim_status(id, status, self.session()).await
    }

    pub async fn reset_claims(&self) -> Result<ApiResult<()>> {
        self.api.reset_claims(self.session()).await
    }

    pub async fn sign_out(self) -> Result<ApiResult<()>> {
        self.api.sign_out(self.session()).await
    }
}
