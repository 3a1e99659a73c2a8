// Framework bootstrap for the game server runtime.

use crate::domain::{Engine, EngineConfig};
use crate::frameworks::config;
use crate::interface_adapters::net::{world_update_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::SystemClock;
use crate::use_cases::{GameEvent, WorldSettings, WorldUpdate, world_task};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::future::Future;
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Everything the server needs to start one world.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub engine: EngineConfig,
    pub missed_tick_behavior: MissedTickBehavior,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            missed_tick_behavior: MissedTickBehavior::Skip,
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self {
            engine: config::engine_config(),
            missed_tick_behavior: config::missed_tick_behavior(),
        }
    }
}

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves until the process exits.
pub async fn run(listener: tokio::net::TcpListener, settings: ServerSettings) -> Result<()> {
    run_until(listener, settings, std::future::pending()).await
}

/// Serves until `shutdown` resolves, then closes sockets and stops the world task.
pub async fn run_until<F>(
    listener: tokio::net::TcpListener,
    settings: ServerSettings,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr()?;
    let (state, world_shutdown, world_handle) = build_state(settings)?;

    // The browser client dials `ws://host`, so the root path is the socket too.
    let app = Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(state.clone());

    tracing::info!(%address, "listening");

    let shutdown_state = state.clone();
    let hook_shutdown = world_shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("shutdown requested");
            let _ = shutdown_state.shutdown_tx.send(true);
            hook_shutdown.notify_one();
        })
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });

    // Covers serve errors, where the graceful hook never ran.
    world_shutdown.notify_one();
    match world_handle.await {
        Ok(engine) => tracing::info!(
            players = engine.players().len(),
            bullets = engine.bullets().len(),
            "world stopped"
        ),
        Err(e) => tracing::error!(error = %e, "world task failed"),
    }

    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    run_until(listener, ServerSettings::from_env(), ctrl_c).await
}

fn build_state(
    settings: ServerSettings,
) -> Result<(Arc<AppState>, Arc<Notify>, JoinHandle<Engine>)> {
    let engine = Engine::from_config(settings.engine.clone())
        .map_err(|e| std::io::Error::other(format!("invalid engine config: {e}")))?;
    tracing::debug!(config = ?settings.engine, "engine configured");

    // Setup Channels
    // input_tx/rx: All joins, leaves and commands go to the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);
    // world_tx/rx: World updates are broadcast to the serializer.
    let (world_tx, _world_rx) = broadcast::channel::<WorldUpdate>(config::WORLD_BROADCAST_CAPACITY);
    // world_bytes_tx/rx: Serialized frames shared across all clients.
    let (world_bytes_tx, _world_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::WORLD_BROADCAST_CAPACITY);
    let (world_latest_tx, _world_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let (shutdown_tx, _shutdown_rx) = watch::channel(false);

    let world_shutdown = Arc::new(Notify::new());

    // Subscribe the serializer before the world task can publish its first tick.
    tokio::spawn(world_update_serializer(
        world_tx.subscribe(),
        world_bytes_tx.clone(),
        world_latest_tx.clone(),
    ));

    // Spawn the authoritative world loop.
    let world_handle = tokio::spawn(world_task(
        engine,
        input_rx,
        world_tx.clone(),
        Arc::new(SystemClock),
        WorldSettings {
            tick_period: settings.engine.tick_period,
            missed_tick_behavior: settings.missed_tick_behavior,
        },
        world_shutdown.clone(),
    ));

    let state = Arc::new(AppState {
        input_tx,
        world_tx,
        world_bytes_tx,
        world_latest_tx,
        shutdown_tx,
    });

    Ok((state, world_shutdown, world_handle))
}
