//! Virtual Classroom Backend
//!
//! Class scheduling dashboard and live classroom page served as a REST
//! backend with SQLite-backed key-value persistence.

mod api;
mod auth;
mod chat;
mod clock;
mod conference;
mod config;
mod db;
mod errors;
mod models;
mod views;
mod whiteboard;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chat::ChatPanel;
use clock::{Clock, SystemClock};
use conference::{generate_classroom_id, ConferenceSession, MediaDevices, SimulatedDevices};
use config::Config;
use db::{KeyValueStore, MemoryKvStore, ScheduleStore, SqliteKvStore};
use errors::AppError;
use views::CalendarCursor;
use whiteboard::Whiteboard;

/// Application state shared across all handlers.
///
/// Locks are always taken schedule before cursor, and conference before
/// chat.
#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<dyn KeyValueStore>,
    pub schedule: Arc<Mutex<ScheduleStore>>,
    pub cursor: Arc<Mutex<CalendarCursor>>,
    pub whiteboard: Arc<Mutex<Whiteboard>>,
    pub conference: Arc<Mutex<ConferenceSession>>,
    pub chat: Arc<Mutex<ChatPanel>>,
    pub devices: Arc<dyn MediaDevices>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Load the schedule and open a fresh classroom session.
    pub async fn new(
        kv: Arc<dyn KeyValueStore>,
        devices: Arc<dyn MediaDevices>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Result<Self, AppError> {
        let now = clock.now();
        let schedule = ScheduleStore::open(kv.clone()).await?;
        tracing::info!("Loaded {} scheduled classes", schedule.classes().len());

        let mut chat = ChatPanel::new(config.chat_reply_delay);
        let conference = ConferenceSession::open(generate_classroom_id(), &mut chat, now);

        Ok(Self {
            kv,
            schedule: Arc::new(Mutex::new(schedule)),
            cursor: Arc::new(Mutex::new(CalendarCursor::containing(now, config.utc_offset))),
            whiteboard: Arc::new(Mutex::new(Whiteboard::new(config.whiteboard_history))),
            conference: Arc::new(Mutex::new(conference)),
            chat: Arc::new(Mutex::new(chat)),
            devices,
            clock,
            config: Arc::new(config),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Virtual Classroom Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Media policy: {:?}", config.media_policy);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (CLASSROOM_API_PSK). Authentication is disabled!");
    }

    // Initialize storage
    let kv: Arc<dyn KeyValueStore> = if config.db_path.as_os_str() == db::EPHEMERAL_DB_PATH {
        tracing::warn!("Ephemeral storage: classes are lost on restart");
        Arc::new(MemoryKvStore::new())
    } else {
        let pool = db::init_database(&config.db_path).await?;
        Arc::new(SqliteKvStore::new(pool))
    };

    let devices: Arc<dyn MediaDevices> = Arc::new(SimulatedDevices::new(config.media_policy));
    let bind_addr = config.bind_addr;

    // Create application state
    let state = AppState::new(kv, devices, Arc::new(SystemClock), config).await?;

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Profile
        .route("/profile", get(api::get_profile).put(api::update_profile))
        // Classes
        .route("/classes", get(api::list_classes).post(api::schedule_class))
        .route("/classes/{id}", get(api::get_class).delete(api::delete_class))
        // Calendar and upcoming list
        .route("/calendar", get(api::get_calendar))
        .route("/calendar/prev", post(api::previous_month))
        .route("/calendar/next", post(api::next_month))
        .route("/calendar/days/{date}", get(api::classes_on_day))
        .route("/upcoming", get(api::upcoming_preview))
        .route("/upcoming/all", get(api::all_upcoming))
        // Whiteboard
        .route("/whiteboard", get(api::get_whiteboard))
        .route("/whiteboard/pointer/down", post(api::pointer_down))
        .route("/whiteboard/pointer/move", post(api::pointer_move))
        .route("/whiteboard/pointer/up", post(api::pointer_up))
        .route("/whiteboard/touch/start", post(api::touch_start))
        .route("/whiteboard/touch/move", post(api::touch_move))
        .route("/whiteboard/touch/end", post(api::touch_end))
        .route("/whiteboard/undo", post(api::undo))
        .route("/whiteboard/redo", post(api::redo))
        .route("/whiteboard/clear", post(api::clear))
        .route("/whiteboard/resize", post(api::resize))
        .route("/whiteboard/eraser", post(api::toggle_eraser))
        .route("/whiteboard/brush", put(api::set_brush))
        // Conference
        .route("/conference", get(api::get_conference))
        .route("/conference/mic", post(api::toggle_mic))
        .route("/conference/camera", post(api::toggle_camera))
        .route("/conference/screen-share", post(api::toggle_screen_share))
        .route(
            "/conference/screen-share/ended",
            post(api::screen_share_ended),
        )
        .route("/conference/leave", post(api::leave_call))
        .route("/conference/invite", get(api::get_invite))
        .route("/conference/join", post(api::join_classroom))
        .route("/conference/participants", post(api::add_participant))
        .route("/conference/participants/{id}", delete(api::remove_participant))
        .route(
            "/conference/participants/{id}/mic",
            post(api::toggle_participant_mic),
        )
        .route(
            "/conference/participants/{id}/camera",
            post(api::toggle_participant_camera),
        )
        .route(
            "/conference/participants/{id}/screen-share",
            post(api::participant_screen_share),
        )
        .route(
            "/conference/participants/{id}/screen-share/ended",
            post(api::participant_screen_share_ended),
        )
        // Chat
        .route("/chat", get(api::get_chat).post(api::send_message))
        .route("/chat/files", post(api::share_file))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
