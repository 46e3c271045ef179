use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::Router;

use crate::{
    config::AppConfig,
    metamodel::{
        CascadeType, ManagedTypeDescriptor, MappingMarker, MarkerKind, MemberDescriptor,
        MetamodelSource, PersistentAttributeKind, StaticSource, TypeShape,
    },
    routes::router,
    state::AppState,
    typegraph::{ExtractResult, TypeGraph},
};

pub fn fixture_path(relative: impl AsRef<Path>) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

/// `Order` with `total` and cascading `items`, `LineItem` pointing back at its
/// order, and `PremiumOrder` extending `Order`.
pub fn shop_source() -> StaticSource {
    let order = Arc::new(
        ManagedTypeDescriptor::entity("Order", "shop.Order")
            .with_member(MemberDescriptor::field(
                "total",
                PersistentAttributeKind::Basic,
                TypeShape::named("double"),
            ))
            .with_member(
                MemberDescriptor::field(
                    "items",
                    PersistentAttributeKind::OneToMany,
                    TypeShape::generic("java.util.List", vec![TypeShape::named("shop.LineItem")]),
                )
                .with_marker(
                    MappingMarker::new(MarkerKind::OneToMany).with_cascade([CascadeType::Remove]),
                ),
            ),
    );

    let line_item = ManagedTypeDescriptor::entity("LineItem", "shop.LineItem").with_member(
        MemberDescriptor::field(
            "order",
            PersistentAttributeKind::ManyToOne,
            TypeShape::named("shop.Order"),
        ),
    );

    let premium_order = ManagedTypeDescriptor::entity("PremiumOrder", "shop.PremiumOrder")
        .with_member(MemberDescriptor::field(
            "discount",
            PersistentAttributeKind::Basic,
            TypeShape::named("double"),
        ))
        .with_supertype(Arc::clone(&order));

    StaticSource::new("shop")
        .with_type(order.as_ref().clone())
        .with_type(line_item)
        .with_type(premium_order)
}

pub fn shop_graph() -> ExtractResult<TypeGraph> {
    let sources: Vec<Arc<dyn MetamodelSource>> = vec![Arc::new(shop_source())];
    TypeGraph::extract(&sources)
}

pub fn test_router(graph: TypeGraph) -> Router {
    let state = AppState::new(AppConfig::default(), graph);
    router(Arc::clone(&state))
}
