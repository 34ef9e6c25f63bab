use std::io::Read;

use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::api::{proxy_error_body, ErrorBody};
use crate::backend::BackendConnection;
use crate::context::Context;
use crate::error::ProxyError;
use crate::request::{InboundRequest, OutboundRequest};
use crate::response::BackendResponse;


const MODULE: &str = "HANDLERS";

pub const HTTP_200: u16 = 200;
pub const HTTP_405: u16 = 405;
pub const HTTP_502: u16 = 502;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

const ANY_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");
const JSON: (&str, &str) = ("Content-Type", "application/json");


pub fn handle_request(mut r: Request, mut ctx: Context) {
    let method = r.method().clone();
    ctx.method = method.to_string();
    ctx.path = r.url().to_string();

    if log_enabled!(log::Level::Debug) {
        let headers: String = r.headers().iter().map(|h| -> String {
            h.to_string()
        }).collect::<Vec<String>>().join("\\r\\n");
        debug!("New Request [qid={}]: method: {}; url: {}; headers='{}'", ctx.qid, ctx.method, ctx.path, headers);
    }

    match method {
        Method::Options => respond(r, &ctx, HTTP_200, Vec::new(), &[
            ANY_ORIGIN,
            ("Access-Control-Allow-Methods", ALLOWED_METHODS),
            ("Access-Control-Allow-Headers", "Content-Type"),
        ]),
        Method::Get | Method::Post | Method::Put | Method::Delete => {
            match forward(&mut r, &ctx) {
                // backend status and body go through as-is; the length is recomputed
                Ok(response) => respond(r, &ctx, response.status, response.body, &[ANY_ORIGIN, JSON]),
                Err(e) => {
                    error!("[{}] [{}] {} {} failed: {}", MODULE, ctx.qid, ctx.method, ctx.path, e);
                    respond(r, &ctx, HTTP_502, proxy_error_body(&e), &[ANY_ORIGIN, JSON])
                }
            }
        }
        _ => {
            let body = ErrorBody::new(format!("Method {} is not allowed", ctx.method)).to_bytes();
            respond(r, &ctx, HTTP_405, body, &[ANY_ORIGIN, JSON, ("Allow", ALLOWED_METHODS)])
        }
    }
}

fn respond(r: Request, ctx: &Context, status: u16, body: Vec<u8>, headers: &[(&str, &str)]) {
    let sent = body.len();
    // tiny_http switches large bodies to chunked encoding; Content-Length must stay
    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_chunked_threshold(usize::MAX);
    for (name, value) in headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(h) => response.add_header(h),
            Err(()) => warn!("[{}] Dropping invalid header {}: {:?}", MODULE, name, value),
        }
    }

    if let Err(e) = r.respond(response) {
        warn!("[{}] [{}] Failed to write response: {}", MODULE, ctx.qid, e);
    }
    info!(
        "[{}] \"{} {}\" {} - {} bytes in {:.3}ms",
        ctx.qid, ctx.method, ctx.path, status, sent, ctx.time_ms()
    );
}

fn forward(r: &mut Request, ctx: &Context) -> Result<BackendResponse, ProxyError> {
    let inbound = read_inbound(r)?;
    let outbound = OutboundRequest::from_inbound(&inbound);
    debug!("[{}] [{}] -> {} ({} body bytes)", MODULE, ctx.qid, outbound.request_line(), outbound.body.len());

    let mut conn = BackendConnection::open(&ctx.settings.backend)?;
    conn.send(&outbound.encode())?;
    let raw = conn.read_to_close()?;
    let response = BackendResponse::parse(&raw)?;

    if let Some(declared) = response.declared_length() {
        if declared != response.body.len() {
            warn!(
                "[{}] [{}] Backend declared {} bytes but sent {}, relaying what was received",
                MODULE, ctx.qid, declared, response.body.len()
            );
        }
    }
    debug!("[{}] [{}] <- {} ({} body bytes)", MODULE, ctx.qid, response.status, response.body.len());

    Ok(response)
}

/// Reads exactly `Content-Length` body bytes; without the header the body is empty.
fn read_inbound(r: &mut Request) -> Result<InboundRequest, ProxyError> {
    let headers = r.headers().iter()
        .map(|h| (h.field.to_string(), h.value.to_string()))
        .collect();

    let expected = r.body_length().unwrap_or(0);
    let mut body = Vec::with_capacity(expected);
    if expected > 0 {
        let reader = r.as_reader();
        reader.take(expected as u64).read_to_end(&mut body).map_err(ProxyError::Inbound)?;
        if body.len() != expected {
            return Err(ProxyError::IncompleteBody { expected, received: body.len() });
        }
    }

    Ok(InboundRequest {
        method: r.method().to_string(),
        path: r.url().to_string(),
        headers,
        body,
    })
}
