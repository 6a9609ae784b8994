//! Device registry: the registration surface the orchestrator exposes
//! to peripherals, plus inbound command routing and pending-change
//! collection for whatever publishes property state.
//!
//! Nodes are registered once during bring-up and never removed.

use core::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::error::{Error, PropertyError, Result};
use crate::node::Node;
use crate::property::{Id, Property, Text, bounded, parse_id};

/// Nodes per device.
pub const MAX_NODES: usize = 8;

type Nodes = heapless::Vec<Rc<Node>, MAX_NODES>;

pub struct Device {
    id: Id,
    name: Text,
    nodes: RefCell<Nodes>,
}

impl Device {
    pub fn new(id: &str, name: &str) -> Result<Self> {
        Ok(Self {
            id: parse_id(id)?,
            name: bounded(name).ok_or(PropertyError::InvalidId)?,
            nodes: RefCell::new(Nodes::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a node. Registration order is kept for iteration.
    pub fn add_node(&self, node: Rc<Node>) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if nodes.iter().any(|n| n.id() == node.id()) {
            return Err(PropertyError::DuplicateId.into());
        }
        info!(
            "device {}: node {} ({}) with {} properties",
            self.id,
            node.id(),
            node.node_type(),
            node.properties().len()
        );
        nodes
            .push(node)
            .map_err(|_| PropertyError::CapacityExceeded.into())
    }

    pub fn node(&self, id: &str) -> Option<Rc<Node>> {
        self.nodes.borrow().iter().find(|n| n.id() == id).cloned()
    }

    /// Snapshot of the registered nodes, in registration order.
    pub fn nodes(&self) -> Nodes {
        self.nodes.borrow().clone()
    }

    pub fn property(&self, node_id: &str, property_id: &str) -> Option<Rc<Property>> {
        self.node(node_id)?.property(property_id).cloned()
    }

    /// Route an inbound command payload to one property.
    pub fn dispatch(&self, node_id: &str, property_id: &str, payload: &str) -> Result<()> {
        let Some(property) = self.property(node_id, property_id) else {
            warn!("device {}: command for unknown {}/{}", self.id, node_id, property_id);
            return Err(PropertyError::NotFound.into());
        };
        debug!("device {}: {}/{} <- {:?}", self.id, node_id, property_id, payload);
        property.on_command(payload)
    }

    /// Route a command addressed by its device-relative topic,
    /// `<node>/<property>/set`.
    pub fn dispatch_topic(&self, topic: &str, payload: &str) -> Result<()> {
        let mut parts = topic.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(node), Some(property), Some("set"), None) => {
                self.dispatch(node, property, payload)
            }
            _ => {
                warn!("device {}: ignoring topic {:?}", self.id, topic);
                Err(Error::Property(PropertyError::NotFound))
            }
        }
    }

    /// Visit every property with an unpublished change, in node then
    /// property registration order, clearing its pending flag.
    ///
    /// Returns the number of properties visited.
    pub fn drain_pending(&self, mut f: impl FnMut(&Node, &Property)) -> usize {
        let mut visited = 0;
        for node in self.nodes() {
            for property in node.properties() {
                if property.take_pending() {
                    f(&node, property);
                    visited += 1;
                }
            }
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::property::{Datatype, PropertyValue};

    fn led_node() -> (Rc<Node>, Rc<Property>) {
        let mut node = Node::new("led", "LED", "LED").unwrap();
        let power = node
            .add_property(Property::new("power", "Power", Datatype::Boolean).unwrap().settable())
            .unwrap();
        (Rc::new(node), power)
    }

    #[test]
    fn duplicate_nodes_are_rejected() {
        let device = Device::new("bridge", "Bridge").unwrap();
        device.add_node(led_node().0).unwrap();
        assert_eq!(
            device.add_node(led_node().0),
            Err(Error::Property(PropertyError::DuplicateId))
        );
    }

    #[test]
    fn dispatch_routes_to_property() {
        let device = Device::new("bridge", "Bridge").unwrap();
        let (node, power) = led_node();
        device.add_node(node).unwrap();

        device.dispatch("led", "power", "true").unwrap();
        assert_eq!(power.get(), Some(PropertyValue::Boolean(true)));

        assert_eq!(
            device.dispatch("led", "power", "1"),
            Err(Error::Decode(DecodeError::Boolean))
        );
        assert_eq!(
            device.dispatch("led", "brightness", "1"),
            Err(Error::Property(PropertyError::NotFound))
        );
    }

    #[test]
    fn dispatch_topic_requires_set_suffix() {
        let device = Device::new("bridge", "Bridge").unwrap();
        let (node, power) = led_node();
        device.add_node(node).unwrap();

        device.dispatch_topic("led/power/set", "true").unwrap();
        assert_eq!(power.get(), Some(PropertyValue::Boolean(true)));
        assert!(device.dispatch_topic("led/power", "false").is_err());
        assert!(device.dispatch_topic("led/power/set/extra", "false").is_err());
        assert_eq!(power.get(), Some(PropertyValue::Boolean(true)));
    }

    #[test]
    fn drain_pending_visits_each_change_once() {
        let device = Device::new("bridge", "Bridge").unwrap();
        let (node, power) = led_node();
        device.add_node(node).unwrap();

        assert_eq!(device.drain_pending(|_, _| {}), 0);
        power.set(true).unwrap();
        power.set(false).unwrap();

        let mut seen = Vec::new();
        let n = device.drain_pending(|node, prop| {
            seen.push(format!("{}/{}={}", node.id(), prop.id(), prop.payload().unwrap()));
        });
        assert_eq!(n, 1);
        assert_eq!(seen, ["led/power=false"]);
        assert_eq!(device.drain_pending(|_, _| {}), 0);
    }
}
