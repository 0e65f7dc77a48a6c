use std::sync::Arc;

use admingate_api::{app, config};

#[tokio::main]
async fn main() {
    admingate_observability::init();

    let token_config = config::token_config_from_env();
    let store = build_store().await;

    let state = app::build_state(token_config, store);
    let router = app::build_app(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, router).await.unwrap();
}

#[cfg(feature = "postgres")]
async fn build_store() -> app::DynIdentityStore {
    use admingate_infra::PostgresIdentityStore;

    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::PgPool::connect(&url)
                .await
                .expect("failed to connect to DATABASE_URL");
            Arc::new(PostgresIdentityStore::new(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; falling back to in-memory identity store");
            Arc::new(admingate_identity::InMemoryIdentityStore::new())
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_store() -> app::DynIdentityStore {
    tracing::warn!("using in-memory identity store; no accounts exist until one is inserted");
    Arc::new(admingate_identity::InMemoryIdentityStore::new())
}
