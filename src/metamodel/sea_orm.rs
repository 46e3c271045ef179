use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use syn::{Attribute, Field, Fields, Item, ItemStruct, LitStr, Type, ext::IdentExt};

use super::{
    CascadeType, FieldMember, ManagedKind, ManagedTypeDescriptor, MappingMarker, MarkerKind,
    MemberDescriptor, MemberOrigin, MetamodelSource, PersistentAttributeKind, SourceError,
    TypeShape,
    syn_utils::{
        collect_rust_files, entity_shape, generic_argument, is_entity_path, last_segment,
        module_path_for_file, parse_rust_file, shape_from_type, skip_meta_value, to_pascal_case,
    },
};

const SHARED_BASE_ENTITY_NAME: &str = "BaseEntity";
const SHARED_BASE_ENTITY_FQN: &str = "base_entity::BaseEntity";

/// Reads sea-orm entity definitions (`#[derive(DeriveEntityModel)]` structs)
/// from Rust source files.
#[derive(Debug, Clone)]
pub struct SeaOrmEntitySource {
    root: PathBuf,
    label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelationKind {
    HasMany,
    HasOne,
    BelongsTo,
}

#[derive(Debug, Default)]
struct RelationAttrs {
    kind: Option<RelationKind>,
    on_delete_cascade: bool,
    on_update_cascade: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BaseEntityColumns {
    id: String,
    created_at: String,
    updated_at: String,
}

impl Default for BaseEntityColumns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            created_at: "created_at".to_string(),
            updated_at: "updated_at".to_string(),
        }
    }
}

struct ScannedEntity {
    module_path: String,
    name: String,
    fields: Vec<ScannedField>,
    base_entity: Option<BaseEntityColumns>,
}

enum ScannedField {
    Scalar {
        name: String,
        ty: Type,
    },
    Relation {
        name: String,
        kind: RelationKind,
        wrapper: Option<String>,
        target: TypeShape,
        cascade: Vec<CascadeType>,
    },
}

impl SeaOrmEntitySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let label = format!("sea-orm:{}", root.display());
        Self { root, label }
    }

    fn scan(&self) -> Result<Vec<ScannedEntity>, SourceError> {
        let base = if self.root.is_file() {
            self.root.parent().unwrap_or(&self.root)
        } else {
            self.root.as_path()
        };

        let mut entities = Vec::new();
        for file in collect_rust_files(&self.root)? {
            let parsed = parse_rust_file(&file)?;
            let module_path = module_path_for_file(&file, base);
            collect_entities(&parsed.items, &module_path, &file, &mut entities)?;
        }
        Ok(entities)
    }
}

impl MetamodelSource for SeaOrmEntitySource {
    fn name(&self) -> &str {
        &self.label
    }

    fn managed_types(&self) -> Result<Vec<ManagedTypeDescriptor>, SourceError> {
        let entities = self.scan()?;
        let descriptors = build_descriptors(&entities);
        tracing::debug!(
            source = %self.label,
            entities = entities.len(),
            descriptors = descriptors.len(),
            "scanned sea-orm entities"
        );
        Ok(descriptors)
    }
}

fn collect_entities(
    items: &[Item],
    module_path: &str,
    file: &Path,
    out: &mut Vec<ScannedEntity>,
) -> Result<(), SourceError> {
    for item in items {
        match item {
            Item::Struct(item_struct) if has_derive_entity_model(&item_struct.attrs) => {
                match scan_entity(item_struct, module_path, file)? {
                    Some(entity) => out.push(entity),
                    None => tracing::warn!(
                        file = %file.display(),
                        "entity model outside of a module; skipping"
                    ),
                }
            }
            Item::Mod(item_mod) => {
                if let Some((_, nested)) = &item_mod.content {
                    let nested_path = if module_path.is_empty() {
                        item_mod.ident.to_string()
                    } else {
                        format!("{}::{}", module_path, item_mod.ident)
                    };
                    collect_entities(nested, &nested_path, file, out)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn has_derive_entity_model(attrs: &[Attribute]) -> bool {
    for attr in attrs {
        if !attr.path().is_ident("derive") {
            continue;
        }
        let paths = attr.parse_args_with(
            syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated,
        );
        if let Ok(paths) = paths {
            for path in paths {
                if let Some(segment) = path.segments.last() {
                    if segment.ident == "DeriveEntityModel" {
                        return true;
                    }
                }
            }
        }
    }
    false
}

fn scan_entity(
    item_struct: &ItemStruct,
    module_path: &str,
    file: &Path,
) -> Result<Option<ScannedEntity>, SourceError> {
    let Some(module) = module_path.split("::").filter(|part| !part.is_empty()).last() else {
        return Ok(None);
    };

    let mut fields = Vec::new();
    if let Fields::Named(named) = &item_struct.fields {
        for field in &named.named {
            fields.push(scan_field(field, file)?);
        }
    }

    Ok(Some(ScannedEntity {
        module_path: module_path.to_string(),
        name: to_pascal_case(module),
        fields,
        base_entity: base_entity_columns(&item_struct.attrs, file)?,
    }))
}

fn scan_field(field: &Field, file: &Path) -> Result<ScannedField, SourceError> {
    let name = field
        .ident
        .as_ref()
        .map(|ident| ident.unraw().to_string())
        .unwrap_or_else(|| "field".to_string());

    let attrs = relation_attrs(&field.attrs, file)?;
    let kind = match attrs.kind {
        Some(kind) => Some(kind),
        None if is_relation_type(&field.ty) => relation_kind_from_type(&field.ty),
        None => None,
    };
    let Some(kind) = kind else {
        return Ok(ScannedField::Scalar {
            name,
            ty: field.ty.clone(),
        });
    };

    let (wrapper, target_ty) = relation_target(&field.ty);
    let target = entity_shape(target_ty).ok_or_else(|| {
        SourceError::Malformed(format!(
            "{}: cannot resolve target entity of relation `{}`",
            file.display(),
            name
        ))
    })?;

    let mut cascade = Vec::new();
    if attrs.on_delete_cascade {
        cascade.push(CascadeType::Remove);
    }
    if attrs.on_update_cascade {
        cascade.push(CascadeType::Merge);
    }

    Ok(ScannedField::Relation {
        name,
        kind,
        wrapper,
        target,
        cascade,
    })
}

fn attribute_error(file: &Path, err: syn::Error) -> SourceError {
    SourceError::Parse {
        path: file.to_path_buf(),
        message: err.to_string(),
    }
}

fn relation_attrs(attrs: &[Attribute], file: &Path) -> Result<RelationAttrs, SourceError> {
    let mut out = RelationAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("sea_orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("has_many") {
                out.kind = Some(RelationKind::HasMany);
            } else if meta.path.is_ident("has_one") {
                out.kind = Some(RelationKind::HasOne);
            } else if meta.path.is_ident("belongs_to") {
                out.kind = Some(RelationKind::BelongsTo);
            } else if meta.path.is_ident("on_delete") {
                let value: LitStr = meta.value()?.parse()?;
                out.on_delete_cascade = value.value().eq_ignore_ascii_case("cascade");
            } else if meta.path.is_ident("on_update") {
                let value: LitStr = meta.value()?.parse()?;
                out.on_update_cascade = value.value().eq_ignore_ascii_case("cascade");
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        })
        .map_err(|err| attribute_error(file, err))?;
    }
    Ok(out)
}

fn is_relation_type(ty: &Type) -> bool {
    if let Some(last) = last_segment(ty) {
        if last == "HasOne" || last == "HasMany" {
            return true;
        }
    }
    generic_argument(ty, "Option")
        .or_else(|| generic_argument(ty, "Vec"))
        .is_some_and(is_entity_path)
}

fn relation_kind_from_type(ty: &Type) -> Option<RelationKind> {
    if generic_argument(ty, "HasMany").is_some() || generic_argument(ty, "Vec").is_some()
    {
        return Some(RelationKind::HasMany);
    }
    if generic_argument(ty, "HasOne").is_some()
        || generic_argument(ty, "Option").is_some()
    {
        return Some(RelationKind::HasOne);
    }
    None
}

/// Splits a relation field type into its collection wrapper (if any) and the
/// referenced entity type.
fn relation_target(ty: &Type) -> (Option<String>, &Type) {
    for wrapper in ["HasMany", "Vec"] {
        if let Some(inner) = generic_argument(ty, wrapper) {
            return (Some(wrapper.to_string()), inner);
        }
    }
    for wrapper in ["HasOne", "Option"] {
        if let Some(inner) = generic_argument(ty, wrapper) {
            return (None, inner);
        }
    }
    (None, ty)
}

fn base_entity_columns(
    attrs: &[Attribute],
    file: &Path,
) -> Result<Option<BaseEntityColumns>, SourceError> {
    let mut config: Option<BaseEntityColumns> = None;
    for attr in attrs {
        if !attr.path().is_ident("base_entity") {
            continue;
        }
        let columns = config.get_or_insert_with(BaseEntityColumns::default);
        if !matches!(attr.meta, syn::Meta::List(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                let value: LitStr = meta.value()?.parse()?;
                columns.id = value.value();
            } else if meta.path.is_ident("created_at") {
                let value: LitStr = meta.value()?.parse()?;
                columns.created_at = value.value();
            } else if meta.path.is_ident("updated_at") {
                let value: LitStr = meta.value()?.parse()?;
                columns.updated_at = value.value();
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        })
        .map_err(|err| attribute_error(file, err))?;
    }
    Ok(config)
}

fn base_entity_descriptor(
    name: &str,
    fqn: &str,
    columns: &BaseEntityColumns,
) -> ManagedTypeDescriptor {
    let timestamp = TypeShape::named("sea_orm::entity::prelude::DateTimeWithTimeZone");
    ManagedTypeDescriptor::new(name, fqn, ManagedKind::MappedSuperclass)
        .with_member(MemberDescriptor::field(
            columns.id.clone(),
            PersistentAttributeKind::Basic,
            TypeShape::named("uuid::Uuid"),
        ))
        .with_member(MemberDescriptor::field(
            columns.created_at.clone(),
            PersistentAttributeKind::Basic,
            timestamp.clone(),
        ))
        .with_member(MemberDescriptor::field(
            columns.updated_at.clone(),
            PersistentAttributeKind::Basic,
            timestamp,
        ))
}

/// `(parent, child)` entity pairs whose `belongs_to` side deletes or updates in cascade.
fn inverse_cascades(entities: &[ScannedEntity]) -> HashSet<(String, String, CascadeType)> {
    let mut out = HashSet::new();
    for entity in entities {
        for field in &entity.fields {
            if let ScannedField::Relation {
                kind: RelationKind::BelongsTo,
                target,
                cascade,
                ..
            } = field
            {
                for op in cascade {
                    out.insert((target.simple_name().to_string(), entity.name.clone(), *op));
                }
            }
        }
    }
    out
}

fn build_descriptors(entities: &[ScannedEntity]) -> Vec<ManagedTypeDescriptor> {
    let inverse = inverse_cascades(entities);
    let mut out = Vec::new();
    let mut shared_base: Option<Arc<ManagedTypeDescriptor>> = None;

    for entity in entities {
        let fqn = format!("{}::{}", entity.module_path, entity.name);
        let mut descriptor = ManagedTypeDescriptor::entity(entity.name.clone(), fqn);

        descriptor.supertype = match &entity.base_entity {
            Some(columns) if *columns == BaseEntityColumns::default() => Some(Arc::clone(
                shared_base.get_or_insert_with(|| {
                    Arc::new(base_entity_descriptor(
                        SHARED_BASE_ENTITY_NAME,
                        SHARED_BASE_ENTITY_FQN,
                        columns,
                    ))
                }),
            )),
            Some(columns) => {
                // Customized columns get a per-entity base, e.g. `AuditLogBase`.
                let base_name = format!("{}Base", entity.name);
                let base_fqn = format!("{}::{}", entity.module_path, base_name);
                let base = base_entity_descriptor(&base_name, &base_fqn, columns);
                out.push(base.clone());
                Some(Arc::new(base))
            }
            None => None,
        };

        for field in &entity.fields {
            descriptor
                .members
                .push(member_for_field(entity, field, &inverse));
        }
        out.push(descriptor);
    }

    if let Some(base) = shared_base {
        out.push((*base).clone());
    }
    out
}

fn member_for_field(
    owner: &ScannedEntity,
    field: &ScannedField,
    inverse: &HashSet<(String, String, CascadeType)>,
) -> MemberDescriptor {
    match field {
        ScannedField::Scalar { name, ty } => {
            let ty = generic_argument(ty, "Option").unwrap_or(ty);
            let shape = shape_from_type(ty);
            let kind = if generic_argument(ty, "Vec").is_some() {
                PersistentAttributeKind::ElementCollection
            } else {
                PersistentAttributeKind::Basic
            };
            MemberDescriptor::field(name.clone(), kind, shape)
        }
        ScannedField::Relation {
            name,
            kind,
            wrapper,
            target,
            cascade,
        } => {
            let (attribute_kind, marker_kind, shape) = match kind {
                RelationKind::HasMany => (
                    PersistentAttributeKind::OneToMany,
                    MarkerKind::OneToMany,
                    TypeShape::generic(
                        wrapper.clone().unwrap_or_else(|| "HasMany".to_string()),
                        vec![target.clone()],
                    ),
                ),
                RelationKind::HasOne => (
                    PersistentAttributeKind::OneToOne,
                    MarkerKind::OneToOne,
                    target.clone(),
                ),
                RelationKind::BelongsTo => (
                    PersistentAttributeKind::ManyToOne,
                    MarkerKind::ManyToOne,
                    target.clone(),
                ),
            };

            let mut marker = MappingMarker::new(marker_kind).with_cascade(cascade.iter().copied());
            if *kind == RelationKind::HasMany {
                for op in [CascadeType::Remove, CascadeType::Merge] {
                    let key = (owner.name.clone(), target.simple_name().to_string(), op);
                    if inverse.contains(&key) {
                        marker.add_cascade(op);
                    }
                }
            }

            MemberDescriptor {
                name: name.clone(),
                declared_type: shape.raw(),
                kind: attribute_kind,
                origin: MemberOrigin::Field(
                    FieldMember::new(name.clone(), shape).with_marker(marker),
                ),
            }
        }
    }
}
