use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

// Metrics are registered once in the default registry
lazy_static! {
    pub static ref CHAT_REQUESTS_TOTAL: Counter =
        register_counter!("chat_relay_requests_total", "Total chat requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("chat_relay_rate_limited_total", "Chat requests denied by the limiter")
            .unwrap();
    pub static ref INVALID_REQUESTS_TOTAL: Counter =
        register_counter!("chat_relay_invalid_requests_total", "Chat requests rejected as invalid")
            .unwrap();
    pub static ref COMPLETION_ERRORS_TOTAL: Counter =
        register_counter!("chat_relay_completion_errors_total", "Failed completion provider calls")
            .unwrap();
    pub static ref COMPLETION_LATENCY: Histogram = register_histogram!(
        "chat_relay_completion_latency_seconds",
        "Completion provider latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("chat_relay_tracked_clients", "Client windows held by the limiter")
            .unwrap();
}
