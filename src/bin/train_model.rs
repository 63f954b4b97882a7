//! Offline Model Trainer Entry Point
//!
//! Fits the isolation forest on synthesized flow history and persists the
//! artifact the monitoring daemon loads at startup.

use aquawatch_core::logic::trainer::{self, TrainConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TrainConfig::default();
    log::info!(
        "Training isolation forest ({} trees, contamination {}, seed {})",
        config.forest.n_estimators,
        config.forest.contamination,
        config.forest.seed
    );

    match trainer::train_and_save(&config) {
        Ok(path) => {
            log::info!("Model trained and saved to {}", path.display());
        }
        Err(e) => {
            log::error!("Training failed: {}", e);
            std::process::exit(1);
        }
    }
}
