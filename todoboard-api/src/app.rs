/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use todoboard_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::from_config(config).await?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{security::SecurityHeadersLayer, session::session_gate},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use todoboard_shared::{
    auth::session::SessionStore,
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::create_pool,
    },
    store::{
        memory::{MemoryTodoStore, MemoryUserStore},
        postgres::{PgTodoStore, PgUserStore},
        TodoStore, UserStore,
    },
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; everything inside
/// is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// To-do items
    pub todos: Arc<dyn TodoStore>,

    /// User accounts
    pub users: Arc<dyn UserStore>,

    /// Login sessions
    pub sessions: Arc<SessionStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates state over the given stores
    pub fn new(todos: Arc<dyn TodoStore>, users: Arc<dyn UserStore>, config: Config) -> Self {
        Self {
            todos,
            users,
            sessions: Arc::new(SessionStore::from_seconds(config.session.ttl_seconds)),
            config: Arc::new(config),
        }
    }

    /// Creates state backed by process-local stores
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            Arc::new(MemoryTodoStore::new()),
            Arc::new(MemoryUserStore::new()),
            config,
        )
    }

    /// Creates state for `config`, connecting to PostgreSQL when configured
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or migrations fail.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let Some(database) = config.database.as_ref() else {
            info!("No DATABASE_URL set, using in-memory stores");
            return Ok(Self::in_memory(config));
        };

        if database.auto_create {
            ensure_database_exists(&database.url).await?;
        }
        let pool = create_pool(database.pool_config()).await?;
        run_migrations(&pool).await?;

        Ok(Self::new(
            Arc::new(PgTodoStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool)),
            config,
        ))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                # Health check (public)
/// ├── POST /login                 # Log in, auto-registering unseen users
/// ├── POST /logout                # End the session
/// ├── /api/todos                  # Session-gated
/// │   ├── GET  /                  # List
/// │   ├── POST /                  # Create
/// │   ├── POST /update            # Partial update
/// │   └── POST /delete            # Delete
/// ├── /todos                      # Same as /api/todos, for the single-user client
/// ├── GET  /                      # Login page (when STATIC_DIR is set)
/// ├── GET  /app                   # To-do client (when STATIC_DIR is set)
/// └── *                           # Static files (when STATIC_DIR is set)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost last):
/// 1. Session gate (to-do routes only)
/// 2. Logging (tower-http TraceLayer)
/// 3. Compression (gzip, brotli)
/// 4. CORS
/// 5. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let todo_routes = Router::new()
        .route("/", get(routes::todos::list_todos).post(routes::todos::create_todo))
        .route("/update", post(routes::todos::update_todo))
        .route("/delete", post(routes::todos::delete_todo))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_gate,
        ));

    let mut router = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .nest("/api/todos", todo_routes.clone())
        .nest("/todos", todo_routes);

    if let Some(dir) = &state.config.api.static_dir {
        info!(dir = %dir.display(), "Serving static files");
        router = router
            .route("/", get(routes::pages::index))
            .route("/app", get(routes::pages::app_page))
            .fallback_service(ServeDir::new(dir));
    }

    let cors = build_cors(&state.config);
    let enable_hsts = state.config.api.production;

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(enable_hsts))
        .with_state(state)
}

fn build_cors(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Credentials are needed for the session cookie
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
