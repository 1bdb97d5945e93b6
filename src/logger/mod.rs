//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - Request line and header echo
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Started Server.");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Content root: {}", config.content.root));
    write_info(&format!(
        "Mode: {}",
        if config.server.concurrent {
            "one task per connection"
        } else {
            "serial"
        }
    ));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_request_line(line: &str) {
    write_info(line);
}

/// Echo discarded header lines
pub fn log_headers(headers: &[String], show: bool) {
    if show {
        for header in headers {
            write_info(header);
        }
    }
}

pub fn log_rejected_request(peer_addr: &SocketAddr, err: &impl std::fmt::Display) {
    write_error(&format!("[REJECT] {peer_addr}: {err}"));
}

pub fn log_connection_error(peer_addr: &SocketAddr, err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve {peer_addr}: {err}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Last line before the process exits with code 1
pub fn log_fatal(err: &impl std::fmt::Display) {
    write_error("ERROR");
    write_error(&format!("[FATAL] {err}"));
}

pub fn log_shutdown() {
    write_info("[Shutdown] Signal received, server stopped");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
