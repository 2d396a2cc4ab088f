use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::database::TaskStore;
use crate::handlers;
use crate::schema::{SchemaError, TaskProjections};

/// Shared, read-only handler dependencies
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub schema: Arc<TaskProjections>,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>) -> Result<Self, SchemaError> {
        Ok(Self {
            store,
            schema: Arc::new(TaskProjections::new()?),
        })
    }
}

pub fn app(state: AppState, api: &ApiConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::root::index))
        .route("/health", get(handlers::root::health))
        .merge(task_routes())
        .fallback(handlers::root::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes));

    if api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn task_routes() -> Router<AppState> {
    use handlers::tasks;

    Router::new()
        // Collection
        .route("/tasks", get(tasks::tasks_get).post(tasks::tasks_post))
        // Individual task
        .route(
            "/tasks/:id",
            get(tasks::task_get)
                .patch(tasks::task_patch)
                .delete(tasks::task_delete),
        )
}
