use dotenvy::dotenv;
use paisa_controller::{
    config::{database, identity, preferences, settings},
    core::{
        dashboard::{format_dashboard_summary, load_dashboard},
        import::forecast_from_csv,
    },
    errors::Result,
    store::Store,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Configuration, preferences and identity
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let prefs = preferences::load_preferences(&app_config.preferences_path)
        .inspect_err(|e| error!("Failed to load preferences: {}", e))?;
    let owner_id = identity::owner_id_from_env()
        .inspect_err(|e| error!("{} not usable: {}", identity::OWNER_ID_VAR, e))?;

    // 4. Database
    let store = Store::connect(&database::get_database_url())
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Dashboard
    let view = load_dashboard(&store, &owner_id, &prefs, &app_config.forecast).await?;
    for alert in &view.alerts {
        tracing::warn!(%owner_id, "{alert}");
    }
    info!("Dashboard for {owner_id}:\n{}", format_dashboard_summary(&view));

    // 6. Optional CSV history passed as the first argument
    if let Some(path) = std::env::args().nth(1) {
        let file = std::fs::File::open(&path)
            .inspect_err(|e| error!("Failed to open {}: {}", path, e))?;
        for forecast in forecast_from_csv(file, &app_config.forecast)? {
            info!(
                category = %forecast.category,
                current = %forecast.current,
                "CSV forecast: {:?}",
                forecast.forecast
            );
        }
    }

    Ok(())
}
