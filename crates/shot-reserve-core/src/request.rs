use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::ServiceError;

/// Kind of the request
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum RequestKind {
    /// Read the event settings
    GetSettings,

    /// Read the remaining stock of every item
    GetInventory,

    /// Atomically claim one unit of an item
    ///
    /// The payload is a [`crate::ClaimShot`], the response a
    /// [`crate::ClaimOutcome`].
    ClaimShot,

    /// Exchange email and password for a session
    SignIn,

    /// Revoke the presented session
    SignOut,

    /// Tell who owns the presented session
    GetSession,

    /// Overwrite the event settings
    ///
    /// 📌 Requires a session.
    UpdateSettings,

    /// Overwrite remaining counts
    ///
    /// 📌 Requires a session.
    SetInventory,

    /// List every claim in creation order
    ///
    /// 📌 Requires a session.
    ListClaims,

    /// Change the status of one claim
    ///
    /// 📌 Requires a session.
    SetClaimStatus,

    /// Delete all claims and restart code sequencing
    ///
    /// 📌 Requires a session.
    ResetClaims,

    /// Useful for sending information for debugging
    Debug,
}

impl RequestKind {
    /// Every kind, in the order of the route table
    pub const ALL: [RequestKind; 12] = [
        RequestKind::GetSettings,
        RequestKind::GetInventory,
        RequestKind::ClaimShot,
        RequestKind::SignIn,
        RequestKind::SignOut,
        RequestKind::GetSession,
        RequestKind::UpdateSettings,
        RequestKind::SetInventory,
        RequestKind::ListClaims,
        RequestKind::SetClaimStatus,
        RequestKind::ResetClaims,
        RequestKind::Debug,
    ];

    /// Path the request is served under
    ///
    /// [`RequestKind::Debug`] also answers every path below this one.
    pub fn path(self) -> &'static str {
        use RequestKind::*;
        match self {
            GetSettings => "/api/settings",
            GetInventory => "/api/inventory",
            ClaimShot => "/api/claim",
            SignIn => "/api/auth/sign_in",
            SignOut => "/api/auth/sign_out",
            GetSession => "/api/auth/session",
            UpdateSettings => "/api/admin/settings",
            SetInventory => "/api/admin/inventory",
            ListClaims => "/api/admin/claims",
            SetClaimStatus => "/api/admin/claims/status",
            ResetClaims => "/api/admin/reset",
            Debug => "/api/debug",
        }
    }

    /// Method the request is sent with
    ///
    /// [`RequestKind::Debug`] accepts both methods.
    pub fn method(self) -> RequestMethod {
        use RequestKind::*;
        match self {
            GetSettings | GetInventory | GetSession | ListClaims | Debug => RequestMethod::Get,
            ClaimShot | SignIn | SignOut | UpdateSettings | SetInventory | SetClaimStatus
            | ResetClaims => RequestMethod::Post,
        }
    }

    /// Find the kind served under `method` and `url`
    ///
    /// Anything after `?` in `url` is ignored.
    pub fn route(method: RequestMethod, url: &str) -> Option<Self> {
        let path = url.split_once('?').map_or(url, |(path, _)| path);
        if path.starts_with(RequestKind::Debug.path()) {
            return Some(RequestKind::Debug);
        }
        RequestKind::ALL
            .into_iter()
            .find(|kind| kind.method() == method && kind.path() == path)
    }

    /// Whether the request must carry a valid admin session
    pub fn requires_session(self) -> bool {
        use RequestKind::*;
        matches!(
            self,
            SignOut | GetSession | UpdateSettings | SetInventory | ListClaims | SetClaimStatus
                | ResetClaims
        )
    }
}

/// Request sent by one of the clients
pub struct Request {
    kind: RequestKind,
    session: Option<Uuid>,
    raw: Box<dyn RawRequest + Send>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("kind", &self.kind)
            .field("session", &self.session.map(|_| ".."))
            .field("raw", &format_args!(".."))
            .finish()
    }
}

/// HTTP request method
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum RequestMethod {
    /// GET request
    Get,
    /// POST request, may have a payload
    Post,
}

/// Interface for handling requests from the clients
pub trait RequestHandler {
    /// Handle a request
    ///
    /// This method may be called concurrently from different threads.
    fn handle(&self, request: Request);

    /// Shut the reservation system down
    fn shutdown(self);
}

/// A raw request, implemented by the transport (HTTP server, test harness)
pub trait RawRequest {
    /// Get the URL
    fn url(&self) -> &str;
    /// Get the request method
    fn method(&self) -> RequestMethod;

    /// Read the request body as bytes
    fn read_bytes(&mut self) -> io::Result<Vec<u8>>;
    /// Read the request body as string
    fn read_string(&mut self) -> io::Result<String>;

    /// Respond with an error status and message
    fn respond_with_err(self: Box<Self>, status: u16, err: String);
    /// Respond with a serialized JSON document
    fn respond_with_json(self: Box<Self>, body: String);
    /// Respond with a plain string
    fn respond_with_string(self: Box<Self>, s: String);
    /// Respond without a body
    fn respond_with_empty(self: Box<Self>);
}

impl Request {
    /// Get the request's kind
    #[inline]
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Get the value of the session header, if present
    #[inline]
    pub fn session_id(&self) -> Option<Uuid> {
        self.session
    }

    /// Get the request URL, e.g. `/api/debug/my-command`
    #[inline]
    pub fn url(&self) -> &str {
        self.raw.url()
    }

    /// Get the request method
    #[inline]
    pub fn method(&self) -> RequestMethod {
        self.raw.method()
    }

    /// Read the payload as bytes
    ///
    /// 📌 Hint: This method has side effects and should be called only once per
    /// request.
    #[inline]
    #[allow(unused)]
    pub fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        self.raw.read_bytes()
    }

    /// Read the payload as a UTF-8 string
    ///
    /// Returns [`Err`] if the payload is invalid UTF-8 or in case of a
    /// communication error.
    #[inline]
    pub fn read_string(&mut self) -> io::Result<String> {
        self.raw.read_string()
    }

    /// Read and deserialize a JSON payload
    ///
    /// Like [`Self::read_string()`], this consumes the body.
    pub fn read_json<T: DeserializeOwned>(&mut self) -> Result<T, ServiceError> {
        let body = self
            .read_string()
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Respond with the given error
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_err(self, err: ServiceError) {
        self.raw.respond_with_err(err.status(), err.to_string());
    }

    /// Respond with `value` encoded as JSON
    ///
    /// This method blocks until the response has been sent.
    pub fn respond_with_json<T: Serialize>(self, value: &T) {
        match serde_json::to_string(value) {
            Ok(body) => self.raw.respond_with_json(body),
            Err(e) => self.respond_with_err(ServiceError::Internal(e.to_string())),
        }
    }

    /// Respond with an arbitrary string
    #[inline]
    pub fn respond_with_string(self, s: impl Into<String>) {
        self.raw.respond_with_string(s.into());
    }

    /// Respond without a body
    #[inline]
    pub fn respond_with_empty(self) {
        self.raw.respond_with_empty();
    }

    /// Answer with `result`: JSON on success, the error otherwise
    pub fn respond_with_result<T: Serialize>(self, result: Result<T, ServiceError>) {
        match result {
            Ok(value) => self.respond_with_json(&value),
            Err(err) => self.respond_with_err(err),
        }
    }

    /// Create a new request from a [`RawRequest`]
    ///
    /// 📌 Hint: Only transports need this.
    #[inline]
    pub fn from_raw(
        kind: RequestKind,
        session: Option<Uuid>,
        raw: Box<dyn RawRequest + Send>,
    ) -> Self {
        Self { kind, session, raw }
    }
}
