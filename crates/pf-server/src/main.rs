//! Portrait Forge server binary.
//!
//! Reads configuration from the environment and serves `POST /characters`.
//! `--bind <addr>` overrides `PF_BIND`.

use pf_server::{AppState, ServerConfig, VisionGenerator, routes};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = match ServerConfig::from_lookup(|key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pf-server: {e}");
            std::process::exit(1);
        }
    };

    // ── `--bind <addr>` ─────────────────────────────────────────────────
    let args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().position(|a| a == "--bind") {
        let Some(value) = args.get(pos + 1) else {
            eprintln!("pf-server: --bind needs an address");
            std::process::exit(1);
        };
        match value.parse::<SocketAddr>() {
            Ok(addr) => config.bind = addr,
            Err(e) => {
                eprintln!("pf-server: invalid --bind {value:?}: {e}");
                std::process::exit(1);
            }
        }
    }

    if !config.generator.has_api_key() {
        log::warn!("GROQ_API_KEY is not set; every description request will fail");
    }
    log::info!("generator: {:?}", config.generator);

    let generator = match VisionGenerator::new(config.generator) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("pf-server: could not build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(Arc::new(generator));
    log::info!("listening on http://{}", config.bind);
    warp::serve(routes(state)).run(config.bind).await;
}
