//! Request reading module
//!
//! Reads the request line and the header lines that follow it. Header lines
//! are never interpreted, only consumed and handed back for logging.

use crate::config::{HeaderMode, RequestConfig};
use crate::error::RequestError;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::time::{timeout_at, Instant};

/// Supported request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

impl Method {
    /// Case-sensitive match on the method token
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Self::Get),
            "HEAD" => Some(Self::Head),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
        }
    }

    /// Whether the response carries the payload
    pub const fn wants_body(self) -> bool {
        matches!(self, Self::Get)
    }
}

/// Validated request: method plus the raw target, leading `/` included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
}

/// Request line and discarded header lines, as read off the wire
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub line: String,
    pub headers: Vec<String>,
}

/// Bounds applied while reading a request
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub header_mode: HeaderMode,
    pub max_line_bytes: usize,
    pub max_header_bytes: usize,
    /// Deadline for the request line; header reading stops quietly at the same deadline
    pub read_timeout: Duration,
}

impl From<&RequestConfig> for RequestLimits {
    fn from(cfg: &RequestConfig) -> Self {
        Self {
            header_mode: cfg.header_mode,
            max_line_bytes: cfg.max_line_bytes,
            max_header_bytes: cfg.max_header_bytes,
            read_timeout: cfg.read_timeout(),
        }
    }
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            header_mode: HeaderMode::Drain,
            max_line_bytes: 8192,
            max_header_bytes: 16_384,
            read_timeout: Duration::from_secs(10),
        }
    }
}

/// Parse `<METHOD> <PATH> <VERSION>`
///
/// Splits on single spaces. Anything after the path is ignored, so the
/// version token is optional.
pub fn parse_request_line(line: &str) -> Result<Request, RequestError> {
    let mut parts = line.split(' ');
    let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
        return Err(RequestError::TooFewParts(line.to_string()));
    };

    let method =
        Method::parse(method).ok_or_else(|| RequestError::UnsupportedMethod(method.to_string()))?;

    Ok(Request {
        method,
        path: path.to_string(),
    })
}

/// Read the request line, then consume header lines according to `limits.header_mode`
pub async fn read_raw_request<R>(
    reader: &mut BufReader<R>,
    limits: &RequestLimits,
) -> Result<RawRequest, RequestError>
where
    R: AsyncRead + Unpin,
{
    let deadline = Instant::now() + limits.read_timeout;
    let line = timeout_at(deadline, read_line(reader, limits.max_line_bytes))
        .await
        .map_err(|_| RequestError::Timeout)??
        .ok_or(RequestError::Closed)?;

    let mut request = RawRequest {
        line: trim_line_ending(&line).to_string(),
        headers: Vec::new(),
    };

    let mut consumed = 0;
    loop {
        // Legacy mode never waits for header bytes that have not arrived yet
        if limits.header_mode == HeaderMode::Buffered && reader.buffer().is_empty() {
            break;
        }

        let remaining = limits.max_header_bytes.saturating_sub(consumed);
        if remaining == 0 {
            break;
        }

        // Headers are only consumed, so running out of time just ends the block
        let header = match timeout_at(deadline, read_line(reader, remaining)).await {
            Ok(Ok(Some(header))) => header,
            Ok(Ok(None) | Err(RequestError::LineTooLong(_))) | Err(_) => break,
            Ok(Err(e)) => return Err(e),
        };
        consumed += header.len();

        let header = trim_line_ending(&header);
        if header.is_empty() {
            if limits.header_mode == HeaderMode::Drain {
                break;
            }
            continue;
        }
        request.headers.push(header.to_string());
    }

    Ok(request)
}

/// Read one `\n`-terminated line of at most `limit` bytes
///
/// Returns `None` when the stream ends before a terminator.
async fn read_line<R>(reader: &mut BufReader<R>, limit: usize) -> Result<Option<String>, RequestError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    (&mut *reader)
        .take(u64::try_from(limit).unwrap_or(u64::MAX))
        .read_until(b'\n', &mut buf)
        .await?;

    if buf.last() == Some(&b'\n') {
        return Ok(Some(String::from_utf8_lossy(&buf).into_owned()));
    }
    if buf.len() >= limit {
        return Err(RequestError::LineTooLong(limit));
    }
    Ok(None)
}

fn trim_line_ending(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}
