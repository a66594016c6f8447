//! `GobangServer` builder and server loop.
//!
//! Ties the layers together: the WebSocket transport feeds connection
//! handlers, which talk to sessions, presence, the matchmaker and rooms.
//! The HTTP listener serves the account endpoints and static files.

use std::net::SocketAddr;
use std::sync::Arc;

use gobang_match::Matchmaker;
use gobang_presence::{Outbox, Presence};
use gobang_protocol::JsonCodec;
use gobang_room::RoomManager;
use gobang_session::SessionManager;
use gobang_store::UserStore;
use gobang_transport::{ConnectionTable, Transport, WebSocketTransport};
use tokio::net::TcpListener;

use crate::handler::handle_connection;
use crate::{AppConfig, GobangError};

/// Shared server state handed to every connection handler and HTTP
/// route. Each component does its own locking.
pub(crate) struct ServerState<S: UserStore> {
    pub(crate) store: Arc<S>,
    pub(crate) sessions: SessionManager,
    pub(crate) outbox: Outbox,
    pub(crate) rooms: Arc<RoomManager<S>>,
    pub(crate) matchmaker: Matchmaker<S>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a gobang server.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use gobang::prelude::*;
///
/// # async fn start() -> Result<(), GobangError> {
/// let server = GobangServerBuilder::new()
///     .config(AppConfig::load())
///     .build(Arc::new(MemoryUserStore::new()))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GobangServerBuilder {
    config: AppConfig,
}

impl GobangServerBuilder {
    /// Creates a builder with [`AppConfig::default`].
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address of the account/static-file listener.
    pub fn http_addr(mut self, addr: &str) -> Self {
        self.config.http_addr = addr.to_string();
        self
    }

    /// Sets the address of the WebSocket listener.
    pub fn ws_addr(mut self, addr: &str) -> Self {
        self.config.ws_addr = addr.to_string();
        self
    }

    /// Binds both listeners and starts the matchmaker.
    ///
    /// # Errors
    /// Fails if either address cannot be bound.
    pub async fn build<S: UserStore>(self, store: Arc<S>) -> Result<GobangServer<S>, GobangError> {
        let config = self.config;
        let transport = WebSocketTransport::bind(&config.ws_addr).await?;
        let http = TcpListener::bind(&config.http_addr).await?;

        let outbox = Outbox::new(Arc::new(Presence::new()), Arc::new(ConnectionTable::new()));
        let rooms = Arc::new(RoomManager::new(
            Arc::clone(&store),
            outbox.clone(),
            config.room_config(),
        ));
        let matchmaker = Matchmaker::start(
            Arc::clone(&store),
            Arc::clone(&rooms),
            outbox.clone(),
            config.match_config(),
        );

        let state = Arc::new(ServerState {
            store,
            sessions: SessionManager::new(config.session_config()),
            outbox,
            rooms,
            matchmaker,
            codec: JsonCodec,
        });

        Ok(GobangServer {
            transport,
            http,
            config,
            state,
        })
    }
}

impl Default for GobangServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound gobang server. Call [`run()`](Self::run) to start serving.
pub struct GobangServer<S: UserStore> {
    transport: WebSocketTransport,
    http: TcpListener,
    config: AppConfig,
    state: Arc<ServerState<S>>,
}

impl<S: UserStore> GobangServer<S> {
    /// The address the WebSocket listener is bound to.
    pub fn ws_local_addr(&self) -> Result<SocketAddr, GobangError> {
        Ok(self.transport.local_addr()?)
    }

    /// The address the HTTP listener is bound to.
    pub fn http_local_addr(&self) -> Result<SocketAddr, GobangError> {
        Ok(self.http.local_addr()?)
    }

    /// Serves HTTP and WebSocket traffic until the HTTP server fails.
    ///
    /// Each accepted WebSocket connection gets its own task. A failed
    /// accept is logged and the loop keeps going.
    pub async fn run(self) -> Result<(), GobangError> {
        let Self {
            mut transport,
            http,
            config,
            state,
        } = self;

        let router = crate::http::router(Arc::clone(&state), &config.web_root);
        tracing::info!(
            http_addr = %config.http_addr,
            ws_addr = %config.ws_addr,
            web_root = %config.web_root.display(),
            "gobang server running"
        );

        let serve_http = async move { axum::serve(http, router).await };
        tokio::select! {
            result = serve_http => {
                result?;
                Ok(())
            }
            () = accept_loop(&mut transport, state) => Ok(()),
        }
    }
}

async fn accept_loop<S: UserStore>(transport: &mut WebSocketTransport, state: Arc<ServerState<S>>) {
    loop {
        match transport.accept().await {
            Ok(conn) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(conn, state).await {
                        tracing::debug!(error = %e, "connection ended with error");
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
            }
        }
    }
}
