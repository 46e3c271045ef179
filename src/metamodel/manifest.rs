use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;

use super::{
    AccessorMember, FieldMember, ManagedKind, ManagedTypeDescriptor, MappingMarker,
    MemberDescriptor, MemberOrigin, MetamodelSource, PersistentAttributeKind, SourceError,
    TypeShape,
};

/// Metamodel described by a JSON manifest file.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
    label: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    types: Vec<ManifestType>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestType {
    name: Option<String>,
    fqn: String,
    #[serde(default)]
    kind: ManagedKind,
    supertype: Option<String>,
    #[serde(default)]
    members: Vec<ManifestMember>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestMember {
    name: String,
    #[serde(rename = "type")]
    declared_type: String,
    kind: PersistentAttributeKind,
    origin: Option<String>,
    accessor: Option<String>,
    #[serde(default)]
    markers: Vec<MappingMarker>,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("manifest:{}", path.display());
        Self { path, label }
    }

    pub fn parse_str(&self, content: &str) -> Result<Vec<ManagedTypeDescriptor>, SourceError> {
        let manifest: ManifestFile =
            serde_json::from_str(content).map_err(|source| SourceError::Manifest {
                path: self.path.clone(),
                source,
            })?;

        let mut by_fqn: HashMap<&str, &ManifestType> = HashMap::new();
        for ty in &manifest.types {
            if by_fqn.insert(ty.fqn.as_str(), ty).is_some() {
                return Err(SourceError::Malformed(format!(
                    "{}: type `{}` declared twice",
                    self.path.display(),
                    ty.fqn
                )));
            }
        }

        let mut resolver = ManifestResolver {
            path: &self.path,
            by_fqn,
            built: HashMap::new(),
            in_progress: HashSet::new(),
        };
        manifest
            .types
            .iter()
            .map(|ty| resolver.resolve(ty).map(|descriptor| (*descriptor).clone()))
            .collect()
    }
}

impl MetamodelSource for ManifestSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn managed_types(&self) -> Result<Vec<ManagedTypeDescriptor>, SourceError> {
        let content =
            fs::read_to_string(&self.path).map_err(|err| SourceError::io(&self.path, err))?;
        self.parse_str(&content)
    }
}

struct ManifestResolver<'a> {
    path: &'a Path,
    by_fqn: HashMap<&'a str, &'a ManifestType>,
    built: HashMap<String, Arc<ManagedTypeDescriptor>>,
    in_progress: HashSet<String>,
}

impl<'a> ManifestResolver<'a> {
    fn resolve(&mut self, ty: &'a ManifestType) -> Result<Arc<ManagedTypeDescriptor>, SourceError> {
        if let Some(done) = self.built.get(&ty.fqn) {
            return Ok(Arc::clone(done));
        }
        if !self.in_progress.insert(ty.fqn.clone()) {
            return Err(SourceError::Malformed(format!(
                "{}: supertype cycle through `{}`",
                self.path.display(),
                ty.fqn
            )));
        }

        let supertype = match ty.supertype.as_deref() {
            Some(parent_fqn) => match self.by_fqn.get(parent_fqn).copied() {
                Some(parent) => Some(self.resolve(parent)?),
                None => {
                    tracing::warn!(
                        manifest = %self.path.display(),
                        managed_type = %ty.fqn,
                        supertype = parent_fqn,
                        "supertype is not a managed type; ignoring"
                    );
                    None
                }
            },
            None => None,
        };

        let name = ty
            .name
            .clone()
            .unwrap_or_else(|| TypeShape::named(ty.fqn.clone()).simple_name().to_string());
        let mut descriptor = ManagedTypeDescriptor::new(name, ty.fqn.clone(), ty.kind);
        descriptor.supertype = supertype;
        for member in &ty.members {
            descriptor.members.push(self.member(member)?);
        }

        let descriptor = Arc::new(descriptor);
        self.in_progress.remove(&ty.fqn);
        self.built.insert(ty.fqn.clone(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    fn member(&self, member: &ManifestMember) -> Result<MemberDescriptor, SourceError> {
        let shape =
            TypeShape::parse(&member.declared_type).map_err(|source| SourceError::Shape {
                path: self.path.to_path_buf(),
                source,
            })?;
        let declared_type = shape.raw();
        let markers = member.markers.clone();

        let origin = match member.origin.as_deref().unwrap_or("field") {
            "field" => MemberOrigin::Field(FieldMember {
                field: member.name.clone(),
                shape,
                markers,
            }),
            "accessor" => {
                let method = member
                    .accessor
                    .clone()
                    .unwrap_or_else(|| default_accessor_name(&member.name));
                MemberOrigin::Accessor(AccessorMember {
                    method,
                    return_shape: shape,
                    markers,
                })
            }
            other => MemberOrigin::Unsupported {
                description: format!("{other} `{}`", member.name),
            },
        };

        Ok(MemberDescriptor {
            name: member.name.clone(),
            declared_type,
            kind: member.kind.clone(),
            origin,
        })
    }
}

fn default_accessor_name(attribute: &str) -> String {
    let mut chars = attribute.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_uppercase(), chars.as_str()),
        None => "get".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::ManifestSource;
    use crate::metamodel::{
        CascadeType, ManagedKind, MarkerKind, MemberAccess, MemberOrigin, PersistentAttributeKind,
        SourceError,
    };

    const SHOP: &str = r#"{
        "types": [
            {
                "fqn": "shop.PremiumOrder",
                "supertype": "shop.Order",
                "members": [
                    { "name": "discount", "type": "double", "kind": "BASIC" }
                ]
            },
            {
                "name": "Order",
                "fqn": "shop.Order",
                "members": [
                    { "name": "total", "type": "double", "kind": "BASIC" },
                    {
                        "name": "items",
                        "type": "java.util.List<shop.LineItem>",
                        "kind": "ONE_TO_MANY",
                        "origin": "accessor",
                        "markers": [ { "kind": "ONE_TO_MANY", "cascade": ["REMOVE"] } ]
                    }
                ]
            },
            {
                "fqn": "shop.Address",
                "kind": "embeddable",
                "supertype": "shop.Missing",
                "members": [
                    { "name": "city", "type": "String", "kind": "BASIC" }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_types_members_and_supertypes() {
        let source = ManifestSource::new("shop.json");
        let types = source.parse_str(SHOP).expect("manifest should parse");
        assert_eq!(types.len(), 3);

        let premium = &types[0];
        assert_eq!(premium.name, "PremiumOrder");
        let parent = premium.supertype.as_ref().expect("supertype resolved");
        assert_eq!(parent.fqn, "shop.Order");

        let order = &types[1];
        let items = &order.members[1];
        assert_eq!(items.kind, PersistentAttributeKind::OneToMany);
        let MemberOrigin::Accessor(accessor) = &items.origin else {
            panic!("items should be accessor-backed");
        };
        assert_eq!(accessor.method, "getItems");
        let marker = accessor.marker(MarkerKind::OneToMany).expect("marker");
        assert_eq!(marker.cascade, vec![CascadeType::Remove]);

        let address = &types[2];
        assert_eq!(address.kind, ManagedKind::Embeddable);
        assert!(address.supertype.is_none());
    }

    #[test]
    fn rejects_supertype_cycles() {
        let source = ManifestSource::new("cycle.json");
        let err = source
            .parse_str(
                r#"{ "types": [
                    { "fqn": "a.A", "supertype": "a.B" },
                    { "fqn": "a.B", "supertype": "a.A" }
                ] }"#,
            )
            .expect_err("cycle should fail");
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn reports_invalid_shapes_and_json() {
        let source = ManifestSource::new("broken.json");
        let err = source
            .parse_str(
                r#"{ "types": [ { "fqn": "a.A", "members": [
                    { "name": "x", "type": "List<", "kind": "BASIC" }
                ] } ] }"#,
            )
            .expect_err("bad shape should fail");
        assert!(matches!(err, SourceError::Shape { .. }));

        let err = source.parse_str("{ not json").expect_err("bad json should fail");
        assert!(matches!(err, SourceError::Manifest { .. }));
    }

    #[test]
    fn unknown_origins_become_unsupported_members() {
        let source = ManifestSource::new("odd.json");
        let types = source
            .parse_str(
                r#"{ "types": [ { "fqn": "a.A", "members": [
                    { "name": "b", "type": "a.B", "kind": "MANY_TO_ONE", "origin": "constructor" }
                ] } ] }"#,
            )
            .expect("manifest should parse");
        assert!(matches!(
            types[0].members[0].origin,
            MemberOrigin::Unsupported { .. }
        ));
    }
}
