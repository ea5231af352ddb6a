use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use sqlx::postgres::PgPoolOptions;

use taskflow::auth::{AuthMiddleware, TokenCodec};
use taskflow::config::{Config, StoreBackend};
use taskflow::routes::{self, health};
use taskflow::state::AppState;
use taskflow::store::{PgTaskStore, PgUserStore};

async fn build_state(config: &Config, tokens: Arc<TokenCodec>) -> io::Result<AppState> {
    match config.store_backend {
        StoreBackend::Memory => {
            info!("using in-memory store; data is lost on restart");
            Ok(AppState::in_memory(tokens, config.bcrypt_cost))
        }
        StoreBackend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "DATABASE_URL must be set")
            })?;

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .map_err(io::Error::other)?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(io::Error::other)?;
            info!("database migrations applied");

            Ok(AppState::new(
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgTaskStore::new(pool)),
                tokens,
                config.bcrypt_cost,
            ))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let tokens = match TokenCodec::from_config(&config) {
        Ok(codec) => Arc::new(codec),
        Err(e) => {
            error!("cannot build token codec: {}", e);
            std::process::exit(1);
        }
    };

    let state = build_state(&config, tokens).await?;
    let authenticator = Arc::new(state.authenticator(&config.public_path_prefix));
    let cors_origins = config.cors_allowed_origins.clone();

    info!("Starting TaskFlow server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(AuthMiddleware::new(Arc::clone(&authenticator)))
            .wrap(Logger::default())
            .wrap(routes::cors(&cors_origins))
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
