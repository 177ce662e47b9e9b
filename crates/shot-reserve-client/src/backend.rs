//! Transport between the clients and the backend

use std::sync::Arc;

use crossbeam::channel::{bounded, Sender};
use shot_reserve_core::{RawRequest, Request, RequestHandler, RequestKind, RequestMethod};
use uuid::Uuid;

use crate::ClientError;

/// A way to reach the reservation backend
pub trait Backend {
    /// Send one request and return the response body
    ///
    /// `body` is a JSON document for requests that carry a payload. An answer
    /// without body comes back as the empty string.
    fn send(
        &self,
        kind: RequestKind,
        session: Option<Uuid>,
        body: Option<String>,
    ) -> Result<String, ClientError>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn send(
        &self,
        kind: RequestKind,
        session: Option<Uuid>,
        body: Option<String>,
    ) -> Result<String, ClientError> {
        (**self).send(kind, session, body)
    }
}

/// Backend living in the same process, driven through its [`RequestHandler`]
pub struct LocalBackend<H> {
    handler: Arc<H>,
}

impl<H> Clone for LocalBackend<H> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<H: RequestHandler> LocalBackend<H> {
    /// Wrap a shared handler
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

type Reply = Result<String, ClientError>;

struct LocalRawRequest {
    kind: RequestKind,
    body: Option<String>,
    reply: Sender<Reply>,
}

impl<H: RequestHandler> Backend for LocalBackend<H> {
    fn send(
        &self,
        kind: RequestKind,
        session: Option<Uuid>,
        body: Option<String>,
    ) -> Result<String, ClientError> {
        let (reply, receiver) = bounded(1);
        let raw = Box::new(LocalRawRequest { kind, body, reply });
        self.handler.handle(Request::from_raw(kind, session, raw));
        receiver
            .recv()
            .map_err(|_| ClientError::Transport(format!("{kind:?} was dropped unanswered")))?
    }
}

impl RawRequest for LocalRawRequest {
    fn url(&self) -> &str {
        self.kind.path()
    }

    fn method(&self) -> RequestMethod {
        self.kind.method()
    }

    fn read_bytes(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(self.body.take().map(String::into_bytes).unwrap_or_default())
    }
    fn read_string(&mut self) -> std::io::Result<String> {
        Ok(self.body.take().unwrap_or_default())
    }

    // The receiver lives until `send` returns, so the sends below cannot fail.
    fn respond_with_err(self: Box<Self>, status: u16, message: String) {
        let _ = self.reply.send(Err(ClientError::Rejected { status, message }));
    }

    fn respond_with_json(self: Box<Self>, body: String) {
        let _ = self.reply.send(Ok(body));
    }

    fn respond_with_string(self: Box<Self>, s: String) {
        let _ = self.reply.send(Ok(s));
    }

    fn respond_with_empty(self: Box<Self>) {
        let _ = self.reply.send(Ok(String::new()));
    }
}
