use tracing::log::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// How many days ahead of today dose instances are materialized.
    /// The window is rolled forward by a daily background job, so it is
    /// kept deliberately short.
    pub materialize_window_days: u32,
    /// How long a cached month indicator stays valid without an explicit
    /// invalidation
    pub indicator_cache_ttl_millis: i64,
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };
        Self {
            port,
            materialize_window_days: 7,
            indicator_cache_ttl_millis: 1000 * 60 * 10, // 10 minutes
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
