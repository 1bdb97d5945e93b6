//! HTTP response building module
//!
//! Renders the status line and header block byte-for-byte and writes the
//! payload after it.

use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const HTTP_VERSION: &str = "HTTP/1.1";
pub const SERVER_NAME: &str = "cihttp";

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Okay,
    NotFound,
    BadRequest,
    NotImplemented,
}

impl Status {
    pub const fn code(self) -> u16 {
        match self {
            Self::Okay => 200,
            Self::NotFound => 404,
            Self::BadRequest => 400,
            Self::NotImplemented => 501,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Self::Okay => "Okay",
            Self::NotFound => "Not found",
            Self::BadRequest => "Bad request",
            Self::NotImplemented => "Not implemented",
        }
    }
}

/// A response: status line, ordered headers, optional payload
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    headers: Vec<(&'static str, String)>,
    body: Option<Vec<u8>>,
    /// Emit the blank line that ends the header block
    terminated: bool,
}

impl Response {
    /// Response with a complete header block
    pub const fn new(status: Status) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
            terminated: true,
        }
    }

    /// Bare status line with no header block; the payload follows it directly
    pub const fn status_only(status: Status) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
            terminated: false,
        }
    }

    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Drop the payload, keeping status and headers (HEAD)
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }

    pub const fn status(&self) -> Status {
        self.status
    }

    #[cfg(test)]
    pub fn headers(&self) -> &[(&'static str, String)] {
        &self.headers
    }

    #[cfg(test)]
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Status line plus header block, exactly as sent
    pub fn head_text(&self) -> String {
        let mut text = format!(
            "{HTTP_VERSION} {} {}\r\n",
            self.status.code(),
            self.status.reason()
        );
        if self.terminated {
            for (name, value) in &self.headers {
                text.push_str(name);
                text.push_str(": ");
                text.push_str(value);
                text.push_str("\r\n");
            }
            text.push_str("\r\n");
        }
        text
    }

    /// Write header text, then the payload if present
    ///
    /// Returns the number of payload bytes written.
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(self.head_text().as_bytes()).await?;
        let mut sent = 0;
        if let Some(body) = &self.body {
            writer.write_all(body).await?;
            sent = body.len();
        }
        writer.flush().await?;
        Ok(sent)
    }
}
