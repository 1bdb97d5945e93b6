// Connection handling module
// Reads one request, writes one response, closes

use std::net::SocketAddr;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::{BadRequestPolicy, Config};
use crate::error::{RequestError, ServerError};
use crate::handler::{self, ContentRoot};
use crate::http::{self, Request, RequestLimits, Response, Status};
use crate::logger::{self, AccessLogEntry};

/// Everything a connection needs, shared by all connections
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub content: ContentRoot,
    pub limits: RequestLimits,
    pub on_bad_request: BadRequestPolicy,
    pub access_log: bool,
    pub access_log_format: String,
    pub show_headers: bool,
}

impl ConnectionContext {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            content: ContentRoot::from_config(&cfg.content),
            limits: RequestLimits::from(&cfg.request),
            on_bad_request: cfg.server.on_bad_request,
            access_log: cfg.logging.access_log,
            access_log_format: cfg.logging.access_log_format.clone(),
            show_headers: cfg.logging.show_headers,
        }
    }
}

/// Serve a single connection.
///
/// Problems that only concern this client are logged and end the connection
/// with `Ok(())`. `Err` means the whole server has to stop: the fallback page
/// is unreadable, or, under the `exit` policy, the request was bad or could
/// not be read at all.
///
/// # Arguments
///
/// * `stream` - The accepted stream
/// * `peer_addr` - The peer's socket address
/// * `ctx` - Shared connection settings
pub async fn handle_connection<S>(
    stream: S,
    peer_addr: SocketAddr,
    ctx: &ConnectionContext,
) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start = Instant::now();
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    let (request, headers) = match read_request(&mut reader, ctx).await {
        Ok(parsed) => parsed,
        Err(e) if e.is_bad_request() => {
            return reject(&mut write_half, peer_addr, e, ctx.on_bad_request).await;
        }
        Err(e) => {
            logger::log_connection_error(&peer_addr, &e);
            if ctx.on_bad_request == BadRequestPolicy::Exit {
                return Err(ServerError::Read(e));
            }
            return Ok(());
        }
    };

    let response = handler::generate_response(request.method, &request.path, &ctx.content).await?;

    let body_bytes = match response.write_to(&mut write_half).await {
        Ok(sent) => sent,
        Err(e) => {
            logger::log_connection_error(&peer_addr, &e);
            return Ok(());
        }
    };
    let _ = write_half.shutdown().await;

    if ctx.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            request.method.as_str().to_string(),
            request.path,
        )
        .with_headers(&headers);
        entry.status = response.status().code();
        entry.body_bytes = body_bytes;
        entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &ctx.access_log_format);
    }

    Ok(())
}

/// Read the request, echo it to the log, validate the request line
async fn read_request<R>(
    reader: &mut BufReader<R>,
    ctx: &ConnectionContext,
) -> Result<(Request, Vec<String>), RequestError>
where
    R: AsyncRead + Unpin,
{
    let raw = http::read_raw_request(reader, &ctx.limits).await?;
    logger::log_request_line(&raw.line);
    logger::log_headers(&raw.headers, ctx.show_headers);

    let request = http::parse_request_line(&raw.line)?;
    Ok((request, raw.headers))
}

/// Apply the bad-request policy
async fn reject<W>(
    writer: &mut W,
    peer_addr: SocketAddr,
    err: RequestError,
    policy: BadRequestPolicy,
) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    logger::log_rejected_request(&peer_addr, &err);

    match policy {
        BadRequestPolicy::Exit => Err(ServerError::BadRequest(err)),
        BadRequestPolicy::Close => Ok(()),
        BadRequestPolicy::Respond => {
            let status = match err {
                RequestError::UnsupportedMethod(_) => Status::NotImplemented,
                _ => Status::BadRequest,
            };
            if let Err(e) = Response::new(status).write_to(writer).await {
                logger::log_connection_error(&peer_addr, &e);
            }
            let _ = writer.shutdown().await;
            Ok(())
        }
    }
}
