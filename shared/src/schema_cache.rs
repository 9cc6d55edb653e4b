use std::{any::TypeId, collections::HashMap, rc::Rc};

use log::debug;

use crate::{
    map::MapSchema,
    protocol::{SyncProtocol, TypeShape},
    schema::{ResolvedSchema, SchemaError, SchemaRole},
};

/// A registered type, ready for use by one side of the replication
#[derive(Clone)]
pub enum ResolvedShape {
    Object(Rc<ResolvedSchema>),
    Map(Rc<dyn MapSchema>),
}

impl ResolvedShape {
    pub fn type_name(&self) -> &str {
        match self {
            ResolvedShape::Object(schema) => schema.type_name(),
            ResolvedShape::Map(schema) => schema.type_name(),
        }
    }
}

/// Validates each type once, on first use, and remembers the result
pub struct SchemaCache {
    role: SchemaRole,
    shapes: HashMap<TypeId, ResolvedShape>,
}

impl SchemaCache {
    pub fn new(role: SchemaRole) -> Self {
        Self {
            role,
            shapes: HashMap::new(),
        }
    }

    pub fn role(&self) -> SchemaRole {
        self.role
    }

    /// Returns `Ok(None)` if the protocol does not register `type_id`
    pub fn resolve(
        &mut self,
        protocol: &SyncProtocol,
        type_id: &TypeId,
    ) -> Result<Option<ResolvedShape>, SchemaError> {
        if let Some(shape) = self.shapes.get(type_id) {
            return Ok(Some(shape.clone()));
        }
        let Some(shape) = protocol.shape(type_id) else {
            return Ok(None);
        };

        let resolved = match shape {
            TypeShape::Object(schema) => ResolvedShape::Object(Rc::new(ResolvedSchema::resolve(
                schema.clone(),
                protocol.codecs(),
                self.role,
            )?)),
            TypeShape::Map(schema) => ResolvedShape::Map(schema.clone()),
        };
        debug!("Validated schema for `{}`", resolved.type_name());
        self.shapes.insert(*type_id, resolved.clone());
        Ok(Some(resolved))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
