use std::sync::Arc;

use placekeeper::app::App;
use placekeeper::config::Config;
use placekeeper::map::TracingMap;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    tracing::info!(storage = ?config.storage, location = ?config.location, "starting");

    let mut app = match App::from_config(&config, Arc::new(TracingMap)).await {
        Ok(app) => app,
        Err(err) => {
            tracing::error!("failed to start: {}", err);
            std::process::exit(1);
        }
    };

    for notice in app.take_notices() {
        tracing::warn!("{}: {}", notice.title(), notice.message());
    }

    for place in app.places() {
        let position: String = place.coordinate.into();
        tracing::info!(
            id = %place.id,
            saved_at = %place.created_at.to_rfc3339(),
            "{} @ {}",
            place.name,
            position
        );
    }

    if !app.can_save() {
        tracing::warn!("no current position, saving is disabled");
    }

    app.shutdown().await;
}
