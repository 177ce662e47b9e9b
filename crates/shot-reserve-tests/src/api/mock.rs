//! Mock API implementation directly using the `shot-reserve-rocket` crate

use std::sync::Arc;

use shot_reserve_core::{RawRequest, Request, RequestHandler, RequestKind};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};

use super::{Api, RequestMsg, Response};

pub struct MockBalancer {
    balancer: Arc<shot_reserve_rocket::Balancer>,
    join_handles: Vec<JoinHandle<()>>,
}

struct MockRawRequest {
    payload: Option<String>,
    kind: RequestKind,
    response_channel: oneshot::Sender<Response>,
}

pub async fn start(threads: u16, config: shot_reserve_core::Config) -> (MockBalancer, Api) {
    let balancer = Arc::new(
        tokio::task::spawn_blocking(move || shot_reserve_rocket::launch(&config))
            .await
            .unwrap(),
    );

    let it = (0..threads).map(|_| {
        let (sender, receiver) = flume::bounded::<RequestMsg>(65536);
        let balancer = balancer.clone();
        let handle = task::spawn_blocking(move || {
            let balancer = &*balancer;
            for msg in receiver.into_iter() {
                let raw = Box::new(MockRawRequest {
                    payload: msg.payload,
                    kind: msg.kind,
                    response_channel: msg.response_channel,
                });
                balancer.handle(Request::from_raw(msg.kind, msg.session, raw))
            }
        });
        (sender, handle)
    });
    let (senders, join_handles) = it.unzip();

    let mock_balancer = MockBalancer {
        balancer,
        join_handles,
    };
    (mock_balancer, Api::new(senders))
}

impl MockBalancer {
    pub async fn shutdown(self) {
        for handle in self.join_handles {
            handle.await.unwrap()
        }
        tracing::debug!("mock balancer threads joined");
        task::spawn_blocking(move || Arc::into_inner(self.balancer).unwrap().shutdown())
            .await
            .unwrap();
    }
}

impl RawRequest for MockRawRequest {
    fn url(&self) -> &str {
        self.kind.path()
    }

    fn method(&self) -> shot_reserve_core::RequestMethod {
        self.kind.method()
    }

    fn read_bytes(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(self.payload.take().map(String::into_bytes).unwrap_or_default())
    }
    fn read_string(&mut self) -> std::io::Result<String> {
        Ok(self.payload.take().unwrap_or_default())
    }

    fn respond_with_err(self: Box<Self>, status: u16, msg: String) {
        self.response_channel
            .send(Response::Error { status, msg })
            .unwrap()
    }

    fn respond_with_json(self: Box<Self>, body: String) {
        self.response_channel.send(Response::Json(body)).unwrap()
    }

    fn respond_with_string(self: Box<Self>, s: String) {
        self.response_channel.send(Response::Text(s)).unwrap()
    }

    fn respond_with_empty(self: Box<Self>) {
        self.response_channel.send(Response::Empty).unwrap()
    }
}
