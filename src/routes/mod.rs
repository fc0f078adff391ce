//! Route modules for the Subraya server

pub mod health;
pub mod highlights;
pub mod pdfs;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Assemble the API router.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/pdfs", pdfs::router())
        .nest("/api/v1/highlights", highlights::router())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum_test::TestServer;

    use crate::config::Config;
    use crate::db::StoreOptions;
    use crate::state::AppState;
    use crate::storage::LocalStorage;

    use super::api_router;

    /// A server backed by a database file inside `dir`.
    pub(crate) fn test_server(dir: &tempfile::TempDir) -> TestServer {
        let url = format!("sqlite:{}", dir.path().join("test.db").display());
        let storage = Arc::new(LocalStorage::new(StoreOptions::new(url)));
        let state = AppState::new(Config::default(), storage);
        TestServer::new(api_router(state)).unwrap()
    }

    #[tokio::test]
    async fn health_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        let server = test_server(&dir);

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
