use std::{net::SocketAddr, sync::Arc};

use portal_backend::{
    account::mail::Mailer,
    auth::TokenKeys,
    config::Config,
    router,
    storage::CloudinaryStorage,
    store::MongoStore,
    Global,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let store = MongoStore::connect(&config.mongodb_uri, &config.db_name).await?;
    store.ensure_indexes().await?;

    let global = Global {
        store: Arc::new(store),
        storage: Arc::new(CloudinaryStorage::new(config.cloudinary.clone())?),
        mailer: Arc::new(Mailer::new(config.smtp.as_ref())?),
        tokens: Arc::new(TokenKeys::new(&config.jwt_secret)),
    };
    let app = router(global, &config.frontend_url);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on {addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutting down");
            }
        })
        .await?;
    Ok(())
}
