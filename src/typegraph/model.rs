use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metamodel::PersistentAttributeKind;

/// One managed type with its own declared attributes and relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    pub name: String,
    pub fqn: String,
    pub super_type: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub relations: BTreeMap<String, RelationInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PersistentAttributeKind,
    pub destination_type: String,
    pub multiple: bool,
    pub cascade: bool,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, fqn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fqn: fqn.into(),
            super_type: None,
            attributes: BTreeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.attributes.contains_key(name) || self.relations.contains_key(name)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationInfo> {
        self.relations.get(name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{RelationInfo, TypeInfo};
    use crate::metamodel::PersistentAttributeKind;

    #[test]
    fn serializes_with_camel_case_field_names() {
        let mut order = TypeInfo::new("Order", "shop.Order");
        order.attributes.insert("total".to_string(), "double".to_string());
        order.relations.insert(
            "items".to_string(),
            RelationInfo {
                name: "items".to_string(),
                kind: PersistentAttributeKind::OneToMany,
                destination_type: "LineItem".to_string(),
                multiple: true,
                cascade: true,
            },
        );

        let value = serde_json::to_value(&order).expect("serialize type info");
        assert_eq!(
            value,
            json!({
                "name": "Order",
                "fqn": "shop.Order",
                "superType": null,
                "attributes": { "total": "double" },
                "relations": {
                    "items": {
                        "name": "items",
                        "type": "ONE_TO_MANY",
                        "destinationType": "LineItem",
                        "multiple": true,
                        "cascade": true
                    }
                }
            })
        );

        let back: TypeInfo = serde_json::from_value(value).expect("deserialize type info");
        assert_eq!(back, order);
        assert!(back.has_member("items"));
        assert!(!back.has_member("missing"));
    }
}
