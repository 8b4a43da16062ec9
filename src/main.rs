use clap::Parser;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod api;
mod config;
mod http;
mod logger;
mod server;
mod store;

/// In-memory shows CRUD service
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Configuration file, without extension (config.toml by default)
    #[arg(short, long, default_value = "config")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cfg = config::Config::load_from(&args.config)?;
    logger::init(&cfg)?;

    // Worker threads follow `server.workers`, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::with_seeded_store(&cfg)?);
    let listener = server::create_listener(addr)?;

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    let shows = state.db.get(api::types::SHOWS)?.len();
    logger::log_server_start(&addr, &cfg, shows);

    // LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            Arc::new(AtomicUsize::new(0)),
            signals,
        ))
        .await;

    Ok(())
}
