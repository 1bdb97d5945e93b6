// Server loop module
// Accepts connections and hands each one to the connection handler

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use super::connection::{handle_connection, ConnectionContext};
use crate::error::ServerError;
use crate::logger;

/// Accept loop.
///
/// With `concurrent` set each connection runs in its own task; otherwise the
/// next connection is accepted only after the current one is closed. Returns
/// `Ok(())` once `shutdown` resolves, or the first fatal error from accept or
/// from any connection.
///
/// In serial mode the connection is served inside the accept arm, so a
/// shutdown signal is only noticed after the current client finishes or hits
/// the read timeout.
pub async fn start_server_loop<F>(
    listener: TcpListener,
    ctx: Arc<ConnectionContext>,
    concurrent: bool,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel::<ServerError>();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                let (stream, peer_addr) = accept_result.map_err(ServerError::Accept)?;
                logger::log_connection_accepted(&peer_addr);

                if concurrent {
                    let ctx = Arc::clone(&ctx);
                    let fatal_tx = fatal_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer_addr, &ctx).await {
                            let _ = fatal_tx.send(e);
                        }
                    });
                } else {
                    handle_connection(stream, peer_addr, &ctx).await?;
                }
            }

            Some(err) = fatal_rx.recv() => return Err(err),

            () = &mut shutdown => {
                logger::log_shutdown();
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BadRequestPolicy;
    use crate::http::RequestLimits;
    use crate::server::listener::create_listener;
    use crate::test_utils::TestRoot;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    struct RunningServer {
        addr: SocketAddr,
        stop: Option<oneshot::Sender<()>>,
        handle: JoinHandle<Result<(), ServerError>>,
        _root: TestRoot,
    }

    fn spawn_server(name: &str, policy: BadRequestPolicy, concurrent: bool) -> RunningServer {
        let root = TestRoot::new(name);
        let ctx = ConnectionContext {
            content: root.content(),
            limits: RequestLimits::default(),
            on_bad_request: policy,
            access_log: false,
            access_log_format: "common".to_string(),
            show_headers: false,
        };

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(start_server_loop(
            listener,
            Arc::new(ctx),
            concurrent,
            async move {
                let _ = stopped.await;
            },
        ));

        RunningServer {
            addr,
            stop: Some(stop),
            handle,
            _root: root,
        }
    }

    async fn send(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request).await.unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let mut server = spawn_server("loop-e2e", BadRequestPolicy::Respond, true);

        let get = send(server.addr, b"GET /index.html HTTP/1.1\r\n\r\n").await;
        let text = String::from_utf8(get.clone()).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 Okay\r\n"));
        assert!(text.contains("Content-length: 12\r\n"));
        assert!(text.ends_with("\r\n\r\nHello World!"));

        let missing = send(server.addr, b"GET /missing.html HTTP/1.1\r\n\r\n").await;
        assert_eq!(missing, b"HTTP/1.1 404 Not found\r\nNot Found");

        let head = send(server.addr, b"HEAD /index.html HTTP/1.1\r\n\r\n").await;
        assert_eq!(head, get[..get.len() - "Hello World!".len()]);

        server.stop.take().unwrap().send(()).unwrap();
        assert!(server.handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_bad_request_keeps_serving() {
        let mut server = spawn_server("loop-respond", BadRequestPolicy::Respond, true);

        let out = send(server.addr, b"POST /x HTTP/1.1\r\n\r\n").await;
        assert_eq!(out, b"HTTP/1.1 501 Not implemented\r\n\r\n");

        let out = send(server.addr, b"GET /missing.html HTTP/1.1\r\n\r\n").await;
        assert_eq!(out, b"HTTP/1.1 404 Not found\r\nNot Found");

        server.stop.take().unwrap().send(()).unwrap();
        assert!(server.handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_exit_policy_stops_server() {
        for concurrent in [true, false] {
            let name = format!("loop-exit-{concurrent}");
            let server = spawn_server(&name, BadRequestPolicy::Exit, concurrent);

            let out = send(server.addr, b"GET\r\n\r\n").await;
            assert!(out.is_empty());

            let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(result, Err(ServerError::BadRequest(_))));
        }
    }

    #[tokio::test]
    async fn test_serial_mode_serves_in_order() {
        let mut server = spawn_server("loop-serial", BadRequestPolicy::Respond, false);

        for _ in 0..3 {
            let out = send(server.addr, b"GET /index.html HTTP/1.1\r\n\r\n").await;
            assert!(out.ends_with(b"Hello World!"));
        }

        server.stop.take().unwrap().send(()).unwrap();
        assert!(server.handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_mode_not_blocked_by_idle_client() {
        let mut server = spawn_server("loop-idle", BadRequestPolicy::Respond, true);

        // Connected but silent; would block a serial server until the read timeout
        let _idle = TcpStream::connect(server.addr).await.unwrap();

        let out = tokio::time::timeout(
            Duration::from_secs(2),
            send(server.addr, b"GET /index.html HTTP/1.1\r\n\r\n"),
        )
        .await
        .unwrap();
        assert!(out.ends_with(b"Hello World!"));

        server.stop.take().unwrap().send(()).unwrap();
        assert!(server.handle.await.unwrap().is_ok());
    }
}
