use super::{ManagedTypeDescriptor, MetamodelSource, SourceError};

/// Descriptors held in memory, handed out as-is.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    name: String,
    types: Vec<ManagedTypeDescriptor>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, descriptor: ManagedTypeDescriptor) -> Self {
        self.types.push(descriptor);
        self
    }
}

impl MetamodelSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn managed_types(&self) -> Result<Vec<ManagedTypeDescriptor>, SourceError> {
        Ok(self.types.clone())
    }
}
