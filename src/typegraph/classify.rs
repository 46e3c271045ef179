use crate::metamodel::{MemberDescriptor, PersistentAttributeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberClass {
    Scalar { type_name: String },
    Relation,
}

/// Basic values and element collections of basic values are scalar; every
/// other kind, including unrecognized ones, is handed to relation resolution.
pub fn classify(member: &MemberDescriptor) -> MemberClass {
    match member.kind {
        PersistentAttributeKind::Basic | PersistentAttributeKind::ElementCollection => {
            MemberClass::Scalar {
                type_name: member.declared_type.simple_name().to_string(),
            }
        }
        _ => MemberClass::Relation,
    }
}
