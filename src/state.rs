//! Application state: configuration, the shared random generator and the
//! score sink.
//!
//! Quiz sessions are not stored here; each WebSocket connection owns its own
//! `Session`. The HTTP problem endpoint draws from the shared generator.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument};

use crate::config::{load_app_config_from_env, AppConfig};
use crate::submit::ScoreSink;

pub struct AppState {
    pub config: AppConfig,
    pub sink: ScoreSink,
    rng: Mutex<StdRng>,
}

impl AppState {
    /// Build state from env: load config, seed the generator, set up the sink.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_app_config_from_env())
    }

    pub fn from_config(config: AppConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => {
                info!(target: "polygon_practice", seed, "Using fixed RNG seed");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        let sink = ScoreSink::new(config.score_webhook_url.clone());
        if sink.is_enabled() {
            info!(target: "polygon_practice", "Score submission enabled.");
        } else {
            info!(target: "polygon_practice", "Score submission disabled (no SCORE_WEBHOOK_URL).");
        }
        info!(target: "polygon_practice", challenge_length = config.challenge_length, "Challenge length");

        Self { config, sink, rng: Mutex::new(rng) }
    }

    /// Run `f` with exclusive access to the shared generator.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A panic while holding the lock leaves the generator usable.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(AppConfig::default())
    }
}
