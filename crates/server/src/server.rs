use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{AttachmentStorage, LedgerStore, LedgerSubscription};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{attachments, categories, statistics, transactions};

/// Multipart bodies carry an image, so the limit is above axum's default.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Source of "now" for the current-month summary.
pub type Clock = fn() -> DateTime<Utc>;

#[derive(Clone)]
pub struct ServerState {
    pub store: LedgerStore,
    pub ledger: Arc<LedgerSubscription>,
    pub attachments: Arc<dyn AttachmentStorage>,
    /// Calendar used for month boundaries and display strings.
    pub timezone: Tz,
    pub clock: Clock,
    /// Directory served under `/uploads`, when attachments are stored locally.
    pub uploads_dir: Option<PathBuf>,
}

impl ServerState {
    /// Starts the ledger subscription; it lives as long as the state.
    pub fn new(store: LedgerStore, attachments: Arc<dyn AttachmentStorage>, timezone: Tz) -> Self {
        let ledger = Arc::new(store.start());
        Self {
            store,
            ledger,
            attachments,
            timezone,
            clock: Utc::now,
            uploads_dir: None,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.uploads_dir = Some(dir.into());
        self
    }
}

pub fn router(state: ServerState) -> Router {
    let mut router = Router::new()
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            put(transactions::update).delete(transactions::delete),
        )
        .route("/transactions/form", post(transactions::submit_form))
        .route("/attachments", post(attachments::upload))
        .route("/summary", get(statistics::summary))
        .route("/chart", get(statistics::chart))
        .route("/categories", get(categories::list));

    if let Some(dir) = &state.uploads_dir {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
