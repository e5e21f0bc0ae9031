//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use crate::application::dispatcher::{ChatRpcHandler, Dispatcher};
use crate::application::services::{ChatService, SessionService};
use crate::config::Settings;
use crate::infrastructure::storage::{KeyValueStore, MemoryStore};
use crate::infrastructure::store::StateStore;
use crate::presentation::http::routes;
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};
use crate::presentation::websocket::BroadcastHub;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub store: StateStore,
    pub hub: Arc<BroadcastHub>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Assemble the application state on top of a key-value substrate.
    pub fn new(storage: Arc<dyn KeyValueStore>, settings: Settings) -> Self {
        let store = StateStore::new(storage);
        let hub = Arc::new(BroadcastHub::new());

        let handler = ChatRpcHandler::new(
            store.clone(),
            ChatService::new(settings.chat.default_password.clone()),
            SessionService::new(hub.clone()),
        );
        let dispatcher = Arc::new(Dispatcher::new(vec![Arc::new(handler)]));

        AppState {
            dispatcher,
            store,
            hub,
            settings: Arc::new(settings),
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        tracing::info!("In-memory key-value store created");

        let state = AppState::new(storage, settings.clone());

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(create_trace_layer())
            .layer(create_cors_layer(&settings.cors));

        // Bind to address
        let addr: SocketAddr = settings.server_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
