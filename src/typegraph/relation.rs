use crate::metamodel::{ManagedTypeDescriptor, MarkerKind, MemberDescriptor};

use super::{ExtractError, ExtractResult, RelationInfo};

/// Builds the relation description of a non-scalar member.
///
/// A parameterized generic shape makes the relation collection-valued and
/// targets its last type parameter, so map-shaped collections point at their
/// values. Only a one-to-many marker is consulted for cascade operations.
pub fn resolve_relation(
    owner: &ManagedTypeDescriptor,
    member: &MemberDescriptor,
) -> ExtractResult<RelationInfo> {
    let access = member
        .origin
        .access()
        .ok_or_else(|| ExtractError::UnsupportedMemberShape {
            owner: owner.fqn.clone(),
            member: member.name.clone(),
            origin: member.origin.describe(),
        })?;

    let shape = access.generic_shape();
    let (multiple, destination) = match shape.last_argument() {
        Some(value_type) => (true, value_type.simple_name()),
        None => (false, member.declared_type.simple_name()),
    };

    if destination.is_empty() {
        return Err(if member.kind.is_recognized() {
            ExtractError::UnresolvedDestination {
                owner: owner.fqn.clone(),
                member: member.name.clone(),
            }
        } else {
            ExtractError::AmbiguousClassification {
                owner: owner.fqn.clone(),
                member: member.name.clone(),
                tag: member.kind.to_string(),
            }
        });
    }

    if !member.kind.is_recognized() {
        tracing::warn!(
            owner = %owner.fqn,
            member = %member.name,
            kind = %member.kind,
            "unrecognized attribute kind; treating as relation"
        );
    }

    let cascade = access
        .marker(MarkerKind::OneToMany)
        .is_some_and(|marker| !marker.cascade.is_empty());

    Ok(RelationInfo {
        name: member.name.clone(),
        kind: member.kind.clone(),
        destination_type: destination.to_string(),
        multiple,
        cascade,
    })
}

#[cfg(test)]
mod tests {
    use super::resolve_relation;
    use crate::{
        metamodel::{
            CascadeType, ManagedTypeDescriptor, MappingMarker, MarkerKind, MemberDescriptor,
            MemberOrigin, PersistentAttributeKind, TypeShape,
        },
        typegraph::ExtractError,
    };

    fn owner() -> ManagedTypeDescriptor {
        ManagedTypeDescriptor::entity("Order", "shop.Order")
    }

    #[test]
    fn collection_shape_targets_last_type_parameter() {
        let member = MemberDescriptor::field(
            "itemsBySku",
            PersistentAttributeKind::OneToMany,
            TypeShape::parse("java.util.Map<java.lang.String, shop.LineItem>").unwrap(),
        );
        let relation = resolve_relation(&owner(), &member).expect("relation resolves");
        assert!(relation.multiple);
        assert_eq!(relation.destination_type, "LineItem");
        assert!(!relation.cascade);
    }

    #[test]
    fn plain_shape_targets_declared_type() {
        let member = MemberDescriptor::accessor(
            "customer",
            "getCustomer",
            PersistentAttributeKind::ManyToOne,
            TypeShape::parse("shop.Customer").unwrap(),
        );
        let relation = resolve_relation(&owner(), &member).expect("relation resolves");
        assert!(!relation.multiple);
        assert_eq!(relation.destination_type, "Customer");
        assert_eq!(relation.kind, PersistentAttributeKind::ManyToOne);
    }

    #[test]
    fn cascade_only_read_from_one_to_many_marker() {
        let one_to_many = MemberDescriptor::field(
            "items",
            PersistentAttributeKind::OneToMany,
            TypeShape::parse("List<LineItem>").unwrap(),
        )
        .with_marker(MappingMarker::new(MarkerKind::OneToMany).with_cascade([CascadeType::Remove]));
        assert!(resolve_relation(&owner(), &one_to_many).unwrap().cascade);

        let empty = MemberDescriptor::field(
            "items",
            PersistentAttributeKind::OneToMany,
            TypeShape::parse("List<LineItem>").unwrap(),
        )
        .with_marker(MappingMarker::new(MarkerKind::OneToMany));
        assert!(!resolve_relation(&owner(), &empty).unwrap().cascade);

        let many_to_one = MemberDescriptor::field(
            "customer",
            PersistentAttributeKind::ManyToOne,
            TypeShape::parse("Customer").unwrap(),
        )
        .with_marker(MappingMarker::new(MarkerKind::ManyToOne).with_cascade([CascadeType::All]));
        assert!(!resolve_relation(&owner(), &many_to_one).unwrap().cascade);
    }

    #[test]
    fn unsupported_origin_fails() {
        let member = MemberDescriptor {
            name: "items".to_string(),
            declared_type: TypeShape::named("List"),
            kind: PersistentAttributeKind::OneToMany,
            origin: MemberOrigin::Unsupported {
                description: "constructor parameter `items`".to_string(),
            },
        };
        let err = resolve_relation(&owner(), &member).expect_err("should fail");
        assert!(matches!(err, ExtractError::UnsupportedMemberShape { .. }));
    }

    #[test]
    fn unrecognized_kind_without_destination_is_ambiguous() {
        let member = MemberDescriptor {
            name: "blob".to_string(),
            declared_type: TypeShape::named(""),
            kind: PersistentAttributeKind::from_tag("ANY"),
            origin: MemberOrigin::Field(crate::metamodel::FieldMember::new(
                "blob",
                TypeShape::named(""),
            )),
        };
        let err = resolve_relation(&owner(), &member).expect_err("should fail");
        assert!(matches!(err, ExtractError::AmbiguousClassification { ref tag, .. } if tag == "ANY"));

        let known = MemberDescriptor {
            kind: PersistentAttributeKind::ManyToOne,
            ..member
        };
        let err = resolve_relation(&owner(), &known).expect_err("should fail");
        assert!(matches!(err, ExtractError::UnresolvedDestination { .. }));
    }

    #[test]
    fn unrecognized_kind_with_destination_resolves() {
        let member = MemberDescriptor::field(
            "legacy",
            PersistentAttributeKind::from_tag("ANY"),
            TypeShape::parse("shop.Legacy").unwrap(),
        );
        let relation = resolve_relation(&owner(), &member).expect("relation resolves");
        assert_eq!(relation.kind.as_str(), "ANY");
        assert_eq!(relation.destination_type, "Legacy");
    }
}
