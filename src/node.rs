//! Nodes: one named group of property cells per physical peripheral.

use std::rc::Rc;

use crate::error::{PropertyError, Result};
use crate::property::{Id, Property, Text, bounded, parse_id};

/// Properties per node.
pub const MAX_PROPERTIES: usize = 8;

pub struct Node {
    id: Id,
    name: Text,
    node_type: Text,
    properties: heapless::Vec<Rc<Property>, MAX_PROPERTIES>,
}

impl Node {
    pub fn new(id: &str, name: &str, node_type: &str) -> Result<Self> {
        Ok(Self {
            id: parse_id(id)?,
            name: bounded(name).ok_or(PropertyError::InvalidId)?,
            node_type: bounded(node_type).ok_or(PropertyError::InvalidId)?,
            properties: heapless::Vec::new(),
        })
    }

    /// Append a property, preserving insertion order.
    ///
    /// Returns the shared handle the owning task writes through.
    pub fn add_property(&mut self, property: Property) -> Result<Rc<Property>> {
        if self.property(property.id()).is_some() {
            return Err(PropertyError::DuplicateId.into());
        }
        let property = Rc::new(property);
        self.properties
            .push(property.clone())
            .map_err(|_| PropertyError::CapacityExceeded)?;
        Ok(property)
    }

    pub fn property(&self, id: &str) -> Option<&Rc<Property>> {
        self.properties.iter().find(|p| p.id() == id)
    }

    pub fn properties(&self) -> &[Rc<Property>] {
        &self.properties
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }
}

impl core::fmt::Debug for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("type", &self.node_type)
            .field("properties", &self.properties.len())
            .finish()
    }
}
