use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{error::AppError, state::AppState, typegraph::TypeInfo};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rest/modelinfo", get(list_types))
        .route("/rest/modelinfo/{name}", get(get_type))
        .with_state(state)
}

async fn list_types(State(state): State<Arc<AppState>>) -> Json<Vec<TypeInfo>> {
    Json(state.graph.list_types().cloned().collect())
}

/// Accepts either a fully-qualified name or a short type name.
async fn get_type(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TypeInfo>, AppError> {
    state
        .graph
        .get(&name)
        .or_else(|| state.graph.find_by_name(&name))
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Managed type `{name}` not found")))
}
