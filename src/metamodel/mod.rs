mod descriptor;
mod error;
mod manifest;
mod sea_orm;
mod shape;
mod static_source;
mod syn_utils;

use std::sync::Arc;

pub use descriptor::{
    AccessorMember, CascadeType, FieldMember, ManagedKind, ManagedTypeDescriptor, MappingMarker,
    MarkerKind, MemberAccess, MemberDescriptor, MemberOrigin, PersistentAttributeKind,
};
pub use error::SourceError;
pub use manifest::ManifestSource;
pub use sea_orm::SeaOrmEntitySource;
pub use shape::{ShapeParseError, TypeShape};
pub use static_source::StaticSource;

use crate::config::MetamodelConfig;

/// A provider of managed type descriptors, e.g. one persistence unit.
pub trait MetamodelSource: Send + Sync {
    fn name(&self) -> &str;

    fn managed_types(&self) -> Result<Vec<ManagedTypeDescriptor>, SourceError>;
}

pub fn sources_from_config(cfg: &MetamodelConfig) -> Vec<Arc<dyn MetamodelSource>> {
    let mut sources: Vec<Arc<dyn MetamodelSource>> = Vec::new();
    for dir in &cfg.entity_dirs {
        sources.push(Arc::new(SeaOrmEntitySource::new(dir)));
    }
    for path in &cfg.manifests {
        sources.push(Arc::new(ManifestSource::new(path)));
    }
    sources
}
