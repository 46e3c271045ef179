use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use crate::metamodel::{ManagedTypeDescriptor, MetamodelSource};

use super::{ExtractError, ExtractResult, TypeInfo, builder::build_type_info};

/// The extracted type graph, keyed by fully-qualified name. Built once and
/// read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeGraph {
    types: BTreeMap<String, TypeInfo>,
}

impl TypeGraph {
    /// Runs every source and builds the graph. Any failure aborts the whole
    /// extraction; a partially extracted graph is never returned.
    pub fn extract(sources: &[Arc<dyn MetamodelSource>]) -> ExtractResult<Self> {
        let mut graph = Self::default();
        for source in sources {
            let descriptors =
                source
                    .managed_types()
                    .map_err(|source_err| ExtractError::SourceUnavailable {
                        source_name: source.name().to_string(),
                        source: source_err,
                    })?;
            tracing::info!(
                source = source.name(),
                types = descriptors.len(),
                "reading metamodel source"
            );
            graph.extend(&descriptors)?;
        }
        tracing::info!(types = graph.len(), "type graph extracted");
        Ok(graph)
    }

    pub fn from_descriptors(descriptors: &[ManagedTypeDescriptor]) -> ExtractResult<Self> {
        let mut graph = Self::default();
        graph.extend(descriptors)?;
        Ok(graph)
    }

    fn extend(&mut self, descriptors: &[ManagedTypeDescriptor]) -> ExtractResult<()> {
        for descriptor in descriptors {
            let info = build_type_info(descriptor)?;
            self.insert(info)?;
        }
        Ok(())
    }

    fn insert(&mut self, info: TypeInfo) -> ExtractResult<()> {
        match self.types.get(&info.fqn) {
            Some(existing) if *existing == info => {
                tracing::debug!(fqn = %info.fqn, "type already extracted; skipping duplicate");
                Ok(())
            }
            Some(_) => Err(ExtractError::DuplicateType { fqn: info.fqn }),
            None => {
                tracing::debug!(
                    fqn = %info.fqn,
                    attributes = info.attributes.len(),
                    relations = info.relations.len(),
                    "extracted type"
                );
                self.types.insert(info.fqn.clone(), info);
                Ok(())
            }
        }
    }

    pub fn list_types(&self) -> impl ExactSizeIterator<Item = &TypeInfo> + '_ {
        self.types.values()
    }

    pub fn get(&self, fqn: &str) -> Option<&TypeInfo> {
        self.types.get(fqn)
    }

    /// Short names are not unique; the first match in fqn order wins.
    pub fn find_by_name(&self, name: &str) -> Option<&TypeInfo> {
        self.types.values().find(|info| info.name == name)
    }

    /// Walks the `superType` chain upwards, nearest parent first.
    pub fn ancestors<'a>(&'a self, info: &'a TypeInfo) -> Vec<&'a TypeInfo> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([info.fqn.as_str()]);
        let mut current = info;
        while let Some(parent) = current
            .super_type
            .as_deref()
            .and_then(|name| self.find_by_name(name))
        {
            if !seen.insert(parent.fqn.as_str()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
