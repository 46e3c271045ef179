use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod model_info;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new().merge(model_info::router(state))
}
