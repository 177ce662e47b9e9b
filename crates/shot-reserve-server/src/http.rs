//! 🏗 HTTP request implementation

use std::fmt::Write;
use std::io;
use std::io::Read;

use shot_reserve_core::{RequestKind, RequestMethod, SESSION_HEADER};
use tiny_http::{Header, Response};
use tracing::{debug, error};
use uuid::Uuid;

/// Body of the 404 answer, listing every route
fn routes() -> String {
    let mut listing = String::from(
        "🦀 could not find the service you are looking for!\n\nValid requests are:",
    );
    for kind in RequestKind::ALL {
        let method = match kind.method() {
            RequestMethod::Get => "GET ",
            RequestMethod::Post => "POST",
        };
        let _ = write!(listing, "\n  {method} {}", kind.path());
        if kind == RequestKind::Debug {
            let _ = write!(listing, "(.*)\n  POST {}(.*)", kind.path());
        }
    }
    listing
}

struct HTTPRequest(tiny_http::Request);

impl shot_reserve_core::RawRequest for HTTPRequest {
    fn url(&self) -> &str {
        self.0.url()
    }

    fn method(&self) -> RequestMethod {
        match self.0.method() {
            tiny_http::Method::Get => RequestMethod::Get,
            _ => RequestMethod::Post,
        }
    }

    fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.0.body_length().unwrap_or(0));
        self.0.as_reader().read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn read_string(&mut self) -> io::Result<String> {
        let mut s = String::with_capacity(self.0.body_length().unwrap_or(0));
        self.0.as_reader().read_to_string(&mut s)?;
        Ok(s)
    }

    fn respond_with_err(self: Box<Self>, status: u16, err: String) {
        respond(self.0, Response::from_string(err).with_status_code(status));
    }

    fn respond_with_json(self: Box<Self>, body: String) {
        let mut res = Response::from_string(body).with_status_code(200);
        res.add_header(header(b"Content-Type", b"application/json"));
        respond(self.0, res);
    }

    fn respond_with_string(self: Box<Self>, s: String) {
        respond(self.0, Response::from_string(s).with_status_code(200));
    }

    fn respond_with_empty(self: Box<Self>) {
        respond(self.0, Response::empty(204));
    }
}

/// Add CORS headers to `res` and send it
///
/// Send failures are logged, not propagated.
fn respond<R: Read>(rq: tiny_http::Request, mut res: Response<R>) {
    add_response_cors_headers(&mut res);
    if let Err(e) = rq.respond(res) {
        error!("HTTP response failed: {e}");
    }
}

/// Parse the given HTTP request
///
/// If [`None`] is returned, the request was already answered with a
/// corresponding error message.
pub fn parse(rq: tiny_http::Request) -> Option<shot_reserve_core::Request> {
    let method = match rq.method() {
        tiny_http::Method::Options => {
            respond(rq, Response::empty(204));
            return None;
        }
        tiny_http::Method::Get => RequestMethod::Get,
        tiny_http::Method::Post => RequestMethod::Post,
        _ => {
            respond(rq, Response::empty(405));
            return None;
        }
    };
    let Some(kind) = RequestKind::route(method, rq.url()) else {
        debug!(url = rq.url(), "no such route");
        respond(rq, Response::from_string(routes()).with_status_code(404));
        return None;
    };

    let session = rq
        .headers()
        .iter()
        .find(|hdr| hdr.field.equiv(SESSION_HEADER))
        .and_then(|hdr| Uuid::parse_str(hdr.value.as_str()).ok());

    Some(shot_reserve_core::Request::from_raw(
        kind,
        session,
        Box::new(HTTPRequest(rq)),
    ))
}

#[inline]
fn header(field: &[u8], value: &[u8]) -> Header {
    Header::from_bytes(field, value).expect("static header must be ASCII")
}

/// Add CORS headers to `res`
fn add_response_cors_headers<R: Read>(res: &mut Response<R>) {
    res.add_header(header(b"Access-Control-Request-Method", b"*"));
    res.add_header(header(b"Access-Control-Allow-Origin", b"*"));
    res.add_header(header(b"Access-Control-Allow-Headers", b"*"));
    res.add_header(header(b"Access-Control-Expose-Headers", b"*"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_listing_names_every_path() {
        let listing = routes();
        for kind in RequestKind::ALL {
            assert!(listing.contains(kind.path()), "{kind:?} missing from {listing}");
        }
        assert!(listing.contains("POST /api/claim"));
        assert!(listing.contains("GET  /api/settings"));
    }
}
