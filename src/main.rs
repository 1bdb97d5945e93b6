use std::process::ExitCode;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

#[cfg(test)]
mod test_utils;

fn main() -> ExitCode {
    let cfg = match config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[ERROR] Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::init(&cfg) {
        eprintln!("[ERROR] Failed to open log files: {e}");
        return ExitCode::FAILURE;
    }

    let addr = match cfg.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            logger::log_fatal(&e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match build_runtime(&cfg.server) {
        Ok(runtime) => runtime,
        Err(e) => {
            logger::log_fatal(&e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server::run(addr, &cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

/// Multi-thread runtime sized by `workers`, or a single thread for the serial accept loop
fn build_runtime(server: &config::ServerConfig) -> std::io::Result<tokio::runtime::Runtime> {
    if !server.concurrent {
        return tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
    }

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }
    runtime_builder.build()
}
