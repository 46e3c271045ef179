use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use super::shape::TypeShape;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PersistentAttributeKind {
    Basic,
    ElementCollection,
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    Embedded,
    Unrecognized(String),
}

impl PersistentAttributeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic => "BASIC",
            Self::ElementCollection => "ELEMENT_COLLECTION",
            Self::OneToOne => "ONE_TO_ONE",
            Self::OneToMany => "ONE_TO_MANY",
            Self::ManyToOne => "MANY_TO_ONE",
            Self::ManyToMany => "MANY_TO_MANY",
            Self::Embedded => "EMBEDDED",
            Self::Unrecognized(tag) => tag.as_str(),
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match normalize_tag(tag).as_str() {
            "BASIC" => Self::Basic,
            "ELEMENT_COLLECTION" => Self::ElementCollection,
            "ONE_TO_ONE" => Self::OneToOne,
            "ONE_TO_MANY" => Self::OneToMany,
            "MANY_TO_ONE" => Self::ManyToOne,
            "MANY_TO_MANY" => Self::ManyToMany,
            "EMBEDDED" => Self::Embedded,
            _ => Self::Unrecognized(tag.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for PersistentAttributeKind {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<PersistentAttributeKind> for String {
    fn from(value: PersistentAttributeKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PersistentAttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CascadeType {
    All,
    Persist,
    Merge,
    Remove,
    Refresh,
    Detach,
}

impl CascadeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Persist => "PERSIST",
            Self::Merge => "MERGE",
            Self::Remove => "REMOVE",
            Self::Refresh => "REFRESH",
            Self::Detach => "DETACH",
        }
    }
}

impl FromStr for CascadeType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_tag(value).as_str() {
            "ALL" => Ok(Self::All),
            "PERSIST" => Ok(Self::Persist),
            "MERGE" => Ok(Self::Merge),
            "REMOVE" => Ok(Self::Remove),
            "REFRESH" => Ok(Self::Refresh),
            "DETACH" => Ok(Self::Detach),
            _ => Err(format!("unknown cascade type `{value}`")),
        }
    }
}

impl TryFrom<String> for CascadeType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CascadeType> for String {
    fn from(value: CascadeType) -> Self {
        value.as_str().to_string()
    }
}

/// Mapping annotation kinds that can carry cascade operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkerKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingMarker {
    pub kind: MarkerKind,
    #[serde(default)]
    pub cascade: Vec<CascadeType>,
}

impl MappingMarker {
    pub fn new(kind: MarkerKind) -> Self {
        Self {
            kind,
            cascade: Vec::new(),
        }
    }

    pub fn with_cascade(mut self, cascade: impl IntoIterator<Item = CascadeType>) -> Self {
        for op in cascade {
            self.add_cascade(op);
        }
        self
    }

    pub fn add_cascade(&mut self, op: CascadeType) {
        if !self.cascade.contains(&op) {
            self.cascade.push(op);
        }
    }
}

/// Reflective view over the program element backing a persistent attribute.
pub trait MemberAccess: fmt::Debug + Send + Sync {
    fn generic_shape(&self) -> &TypeShape;

    fn marker(&self, kind: MarkerKind) -> Option<&MappingMarker>;

    fn location(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMember {
    pub field: String,
    pub shape: TypeShape,
    pub markers: Vec<MappingMarker>,
}

impl FieldMember {
    pub fn new(field: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            field: field.into(),
            shape,
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: MappingMarker) -> Self {
        self.markers.push(marker);
        self
    }
}

impl MemberAccess for FieldMember {
    fn generic_shape(&self) -> &TypeShape {
        &self.shape
    }

    fn marker(&self, kind: MarkerKind) -> Option<&MappingMarker> {
        self.markers.iter().find(|marker| marker.kind == kind)
    }

    fn location(&self) -> String {
        format!("field `{}`", self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorMember {
    pub method: String,
    pub return_shape: TypeShape,
    pub markers: Vec<MappingMarker>,
}

impl AccessorMember {
    pub fn new(method: impl Into<String>, return_shape: TypeShape) -> Self {
        Self {
            method: method.into(),
            return_shape,
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: MappingMarker) -> Self {
        self.markers.push(marker);
        self
    }
}

impl MemberAccess for AccessorMember {
    fn generic_shape(&self) -> &TypeShape {
        &self.return_shape
    }

    fn marker(&self, kind: MarkerKind) -> Option<&MappingMarker> {
        self.markers.iter().find(|marker| marker.kind == kind)
    }

    fn location(&self) -> String {
        format!("accessor `{}()`", self.method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberOrigin {
    Field(FieldMember),
    Accessor(AccessorMember),
    Unsupported { description: String },
}

impl MemberOrigin {
    pub fn access(&self) -> Option<&dyn MemberAccess> {
        match self {
            Self::Field(field) => Some(field),
            Self::Accessor(accessor) => Some(accessor),
            Self::Unsupported { .. } => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Field(field) => field.location(),
            Self::Accessor(accessor) => accessor.location(),
            Self::Unsupported { description } => description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub name: String,
    /// Raw declared type of the attribute, without type parameters.
    pub declared_type: TypeShape,
    pub kind: PersistentAttributeKind,
    pub origin: MemberOrigin,
}

impl MemberDescriptor {
    pub fn field(name: impl Into<String>, kind: PersistentAttributeKind, shape: TypeShape) -> Self {
        let name = name.into();
        Self {
            declared_type: shape.raw(),
            origin: MemberOrigin::Field(FieldMember::new(name.clone(), shape)),
            name,
            kind,
        }
    }

    pub fn accessor(
        name: impl Into<String>,
        method: impl Into<String>,
        kind: PersistentAttributeKind,
        shape: TypeShape,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: shape.raw(),
            kind,
            origin: MemberOrigin::Accessor(AccessorMember::new(method, shape)),
        }
    }

    /// Attaches a mapping marker to the backing field or accessor. Unsupported
    /// origins carry no markers; the marker is discarded there.
    pub fn with_marker(mut self, marker: MappingMarker) -> Self {
        match &mut self.origin {
            MemberOrigin::Field(field) => field.markers.push(marker),
            MemberOrigin::Accessor(accessor) => accessor.markers.push(marker),
            MemberOrigin::Unsupported { .. } => {}
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagedKind {
    #[default]
    Entity,
    MappedSuperclass,
    Embeddable,
}

impl ManagedKind {
    /// Entities and mapped superclasses take part in inheritance; embeddables do not.
    pub fn is_identifiable(self) -> bool {
        matches!(self, Self::Entity | Self::MappedSuperclass)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedTypeDescriptor {
    pub name: String,
    pub fqn: String,
    pub kind: ManagedKind,
    pub members: Vec<MemberDescriptor>,
    pub supertype: Option<Arc<ManagedTypeDescriptor>>,
}

impl ManagedTypeDescriptor {
    pub fn new(name: impl Into<String>, fqn: impl Into<String>, kind: ManagedKind) -> Self {
        Self {
            name: name.into(),
            fqn: fqn.into(),
            kind,
            members: Vec::new(),
            supertype: None,
        }
    }

    pub fn entity(name: impl Into<String>, fqn: impl Into<String>) -> Self {
        Self::new(name, fqn, ManagedKind::Entity)
    }

    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_supertype(mut self, parent: Arc<ManagedTypeDescriptor>) -> Self {
        self.supertype = Some(parent);
        self
    }

    pub fn declared_members(&self) -> &[MemberDescriptor] {
        &self.members
    }
}

fn normalize_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len() + 4);
    let mut prev_lower = false;
    for ch in tag.trim().chars() {
        if ch == '-' || ch == ' ' || ch == '_' {
            out.push('_');
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_uppercase());
    }
    out
}
