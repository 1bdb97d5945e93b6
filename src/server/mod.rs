// Server module entry point
// Binds the listener and runs the accept loop until a signal or a fatal error

pub mod connection;
pub mod listener;
pub mod signal;

// Rust does not allow `loop` as a module name
#[path = "loop.rs"]
pub mod server_loop;

use std::net::SocketAddr;
use std::sync::Arc;

pub use connection::ConnectionContext;
pub use listener::create_listener;
pub use server_loop::start_server_loop;

use crate::config::Config;
use crate::error::ServerError;
use crate::logger;

/// Bind `addr` and serve until SIGINT/SIGTERM (`Ok`) or a fatal error (`Err`)
pub async fn run(addr: SocketAddr, config: &Config) -> Result<(), ServerError> {
    let listener =
        create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;

    let ctx = ConnectionContext::from_config(config);
    if !ctx.content.fallback_path().is_file() {
        logger::log_warning(&format!(
            "Fallback file '{}' not found under '{}'; the first 404 will stop the server",
            ctx.content.fallback_path().display(),
            ctx.content.root().display()
        ));
    }

    logger::log_server_start(&addr, config);
    start_server_loop(
        listener,
        Arc::new(ctx),
        config.server.concurrent,
        signal::shutdown_signal(),
    )
    .await
}
