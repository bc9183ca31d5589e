mod config;
mod emoji;
mod errors;
mod layout;
mod render;
mod routes;
mod slack_client;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::emoji::store::{EmojiStore, SlackEmojiStore};
use crate::render::FontLibrary;
use crate::routes::build_router;
use crate::slack_client::SlackClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting emoji API v{}", env!("CARGO_PKG_VERSION"));

    // Font scanning touches the filesystem heavily; keep it off the runtime threads.
    let load_system_fonts = config.load_system_fonts;
    let font_dir = config.font_dir.clone();
    let fonts = tokio::task::spawn_blocking(move || {
        FontLibrary::load(load_system_fonts, font_dir.as_deref())
    })
    .await?;
    if fonts.face_count() == 0 {
        warn!("No fonts loaded; canvas fitting and rendering will answer 503");
    }

    let emoji_store: Option<Arc<dyn EmojiStore>> = match &config.slack_token {
        Some(token) => {
            let client = SlackClient::new(token.clone(), &config.slack_api_base)?;
            info!("Slack client initialized ({})", config.slack_api_base);
            Some(Arc::new(SlackEmojiStore(client)))
        }
        None => {
            warn!("SLACK_TOKEN not set; emoji list and upload routes are disabled");
            None
        }
    };

    info!(
        margin = ?config.default_margin,
        max_px = config.default_max_font_px,
        "Auto-fit defaults"
    );

    let state = AppState {
        config: config.clone(),
        emoji_store,
        fonts,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
