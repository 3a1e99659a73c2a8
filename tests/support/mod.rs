// Shared primitives for server bootstrapping across integration tests.
// Not every test binary uses every helper.
#![allow(dead_code)]

use grid_shooter::ServerSettings;
use grid_shooter::domain::EngineConfig;
use tokio::{sync::oneshot, task::JoinHandle};
use std::{
    // `Arc` shares data between threads; `OnceLock` writes a value only once.
    sync::{Arc, OnceLock},
    // Sleep durations are used in readiness polling loops.
    time::Duration,
};

pub const FIELD_WIDTH: usize = 8;
pub const FIELD_HEIGHT: usize = 6;

// Global socket URL used by all tests after the server publishes its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Small seeded field with a fast tick so frames arrive quickly.
fn test_settings() -> ServerSettings {
    ServerSettings {
        engine: EngineConfig {
            tick_period: Duration::from_millis(20),
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            wall_probability: 0.3,
            seed: Some(42),
            ..EngineConfig::default()
        },
        ..ServerSettings::default()
    }
}

// Ensure the test server is running and return the shared `ws://` URL.
pub fn ensure_server() -> &'static str {
    // Run initialization exactly once even if multiple tests call this function.
    SERVER_READY.get_or_init(|| {
        let published_addr = Arc::new(OnceLock::<String>::new());
        let published_addr_thread = Arc::clone(&published_addr);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_addr_thread.set(addr.to_string());
                // Serve until the test process exits.
                grid_shooter::run(listener, test_settings())
                    .await
                    .expect("server failed");
            });
        });
        wait_for_server_readiness(published_addr);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Wait for address publication and then for the socket to accept TCP connections.
fn wait_for_server_readiness(published_addr: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published_addr.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(format!("ws://{addr}/"));

    // Retry for a short period to avoid racing server bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

// Open field for servers owned by a single test.
pub fn open_field() -> EngineConfig {
    EngineConfig {
        tick_period: Duration::from_millis(20),
        field_width: 6,
        field_height: 4,
        wall_probability: 0.0,
        seed: Some(9),
        ..EngineConfig::default()
    }
}

// A server owned by one test, stopped through `stop`.
pub struct PrivateServer {
    pub url: String,
    pub stop: oneshot::Sender<()>,
    pub handle: JoinHandle<std::io::Result<()>>,
}

// Start a server on the caller's runtime that serves until `stop` fires.
pub async fn start_private_server(engine: EngineConfig) -> PrivateServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    let settings = ServerSettings {
        engine,
        ..ServerSettings::default()
    };

    let (stop, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(grid_shooter::run_until(listener, settings, async move {
        let _ = stop_rx.await;
    }));

    PrivateServer {
        url: format!("ws://{addr}/"),
        stop,
        handle,
    }
}
