mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
use repos::Repos;
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tracing::info;

#[derive(Clone)]
pub struct DoseTrackContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifier: Arc<dyn INotifier>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl DoseTrackContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        Self {
            repos,
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            notifier: Arc::new(WebhookNotifier::new()),
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            notifier: Arc::new(InMemoryNotifier::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment.
/// Without a `DATABASE_URL` everything runs against the inmemory
/// repositories, which is what the tests use.
pub async fn setup_context() -> DoseTrackContext {
    match get_psql_connection_string() {
        Some(connection_string) => {
            DoseTrackContext::create(ContextParams {
                postgres_connection_string: connection_string,
            })
            .await
        }
        None => {
            info!("DATABASE_URL not set, using inmemory repositories");
            DoseTrackContext::create_inmemory()
        }
    }
}

fn get_psql_connection_string() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let connection_string =
        get_psql_connection_string().expect("DATABASE_URL env var to be present");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
