use std::sync::Arc;

use crate::completion::ChatCompletion;
use crate::rate_limit::RateLimiter;

// app's shared state, built once in main and shared by every handler
pub struct AppState {
    pub completion: Arc<dyn ChatCompletion>,
    pub rate_limiter: RateLimiter,
    pub model: String, // model identifier sent upstream and reported by /health
}

impl AppState {
    pub fn new(
        completion: Arc<dyn ChatCompletion>,
        rate_limiter: RateLimiter,
        model: String,
    ) -> Self {
        Self {
            completion,
            rate_limiter,
            model,
        }
    }
}
