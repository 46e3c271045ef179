mod builder;
mod catalog;
mod classify;
mod error;
mod model;
mod relation;

pub use builder::build_type_info;
pub use catalog::TypeGraph;
pub use classify::{MemberClass, classify};
pub use error::{ExtractError, ExtractResult};
pub use model::{RelationInfo, TypeInfo};
pub use relation::resolve_relation;
