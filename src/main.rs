//! AquaWatch Core - Monitoring Daemon Entry Point

use aquawatch_core::constants;
use aquawatch_core::logic::model::{artifact, AnomalyScorer};
use aquawatch_core::logic::monitor::{self, MonitorConfig};
use aquawatch_core::logic::store::{RtdbClient, StoreConfig};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting {} Core v{}...",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    // The one unrecoverable startup error: no model, no scoring.
    let model_path = constants::get_model_path();
    let model_artifact = match artifact::load(&model_path) {
        Ok(a) => a,
        Err(e) => {
            log::error!("Could not load model from {}: {}", model_path.display(), e);
            log::error!("Run the `train_model` binary first to produce an artifact");
            std::process::exit(1);
        }
    };

    let scorer = AnomalyScorer::new(model_artifact.model);

    let store_config = StoreConfig::default();
    log::info!("Sensor store: {}/{}", store_config.database_url, store_config.path);
    let store = RtdbClient::new(store_config);

    monitor::run_loop(&store, &scorer, &MonitorConfig::default()).await;
}
