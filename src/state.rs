use std::sync::Arc;

use crate::{config::AppConfig, typegraph::TypeGraph};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub graph: Arc<TypeGraph>,
}

impl AppState {
    pub fn new(config: AppConfig, graph: TypeGraph) -> Arc<Self> {
        Arc::new(Self {
            config,
            graph: Arc::new(graph),
        })
    }
}
