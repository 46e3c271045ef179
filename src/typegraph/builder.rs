use crate::metamodel::ManagedTypeDescriptor;

use super::{
    ExtractError, ExtractResult, TypeInfo,
    classify::{MemberClass, classify},
    relation::resolve_relation,
};

/// Describes one managed type from its declared members. Inherited members stay
/// on the supertype's own `TypeInfo`.
pub fn build_type_info(descriptor: &ManagedTypeDescriptor) -> ExtractResult<TypeInfo> {
    let mut info = TypeInfo::new(descriptor.name.clone(), descriptor.fqn.clone());

    for member in descriptor.declared_members() {
        if info.has_member(&member.name) {
            return Err(ExtractError::DuplicateMember {
                owner: descriptor.fqn.clone(),
                member: member.name.clone(),
            });
        }

        match classify(member) {
            MemberClass::Scalar { type_name } => {
                info.attributes.insert(member.name.clone(), type_name);
            }
            MemberClass::Relation => {
                let relation = resolve_relation(descriptor, member)?;
                info.relations.insert(relation.name.clone(), relation);
            }
        }
    }

    if descriptor.kind.is_identifiable() {
        info.super_type = descriptor
            .supertype
            .as_ref()
            .filter(|parent| parent.kind.is_identifiable())
            .map(|parent| parent.name.clone());
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::build_type_info;
    use crate::{
        metamodel::{
            ManagedKind, ManagedTypeDescriptor, MemberDescriptor, PersistentAttributeKind,
            TypeShape,
        },
        typegraph::ExtractError,
    };

    fn basic(name: &str, ty: &str) -> MemberDescriptor {
        MemberDescriptor::field(name, PersistentAttributeKind::Basic, TypeShape::parse(ty).unwrap())
    }

    #[test]
    fn every_scalar_member_becomes_an_attribute() {
        let descriptor = ManagedTypeDescriptor::entity("Customer", "shop.Customer")
            .with_member(basic("id", "long"))
            .with_member(basic("name", "java.lang.String"))
            .with_member(basic("email", "java.lang.String"))
            .with_member(MemberDescriptor::field(
                "aliases",
                PersistentAttributeKind::ElementCollection,
                TypeShape::parse("java.util.Set<java.lang.String>").unwrap(),
            ));

        let info = build_type_info(&descriptor).expect("type builds");
        assert_eq!(info.attributes.len(), 4);
        assert_eq!(info.attributes["id"], "long");
        assert_eq!(info.attributes["name"], "String");
        assert_eq!(info.attributes["aliases"], "Set");
        assert!(info.relations.is_empty());
        assert_eq!(info.super_type, None);
    }

    #[test]
    fn duplicate_member_names_are_rejected() {
        let descriptor = ManagedTypeDescriptor::entity("Customer", "shop.Customer")
            .with_member(basic("name", "String"))
            .with_member(MemberDescriptor::field(
                "name",
                PersistentAttributeKind::ManyToOne,
                TypeShape::named("shop.Name"),
            ));

        let err = build_type_info(&descriptor).expect_err("duplicate should fail");
        assert!(matches!(err, ExtractError::DuplicateMember { ref member, .. } if member == "name"));
    }

    #[test]
    fn supertype_only_for_identifiable_types() {
        let parent = Arc::new(
            ManagedTypeDescriptor::entity("Order", "shop.Order").with_member(basic("total", "double")),
        );
        let child = ManagedTypeDescriptor::entity("PremiumOrder", "shop.PremiumOrder")
            .with_member(basic("discount", "double"))
            .with_supertype(Arc::clone(&parent));
        let info = build_type_info(&child).expect("type builds");
        assert_eq!(info.super_type.as_deref(), Some("Order"));
        assert!(!info.attributes.contains_key("total"));

        let embeddable = ManagedTypeDescriptor::new("Address", "shop.Address", ManagedKind::Embeddable)
            .with_supertype(parent);
        let info = build_type_info(&embeddable).expect("type builds");
        assert_eq!(info.super_type, None);

        let orphan = ManagedTypeDescriptor::entity("Note", "shop.Note").with_supertype(Arc::new(
            ManagedTypeDescriptor::new("Money", "shop.Money", ManagedKind::Embeddable),
        ));
        assert_eq!(build_type_info(&orphan).unwrap().super_type, None);
    }
}
