//! Log-based property sink.
//!
//! Implements [`PropertySink`] by writing every published change to the
//! serial console, in topic form. A networked transport implements the
//! same trait.

use log::info;

use crate::app::ports::PropertySink;
use crate::node::Node;
use crate::property::{Id, Property};

pub struct LogPropertySink {
    device_id: Id,
    published: u32,
}

impl LogPropertySink {
    pub fn new(device_id: &str) -> Self {
        let mut id = Id::new();
        // Device ids are validated to fit before the sink is built.
        let _ = id.push_str(device_id);
        Self {
            device_id: id,
            published: 0,
        }
    }

    pub fn published(&self) -> u32 {
        self.published
    }
}

impl PropertySink for LogPropertySink {
    fn publish(&mut self, node: &Node, property: &Property, payload: &str) {
        self.published = self.published.wrapping_add(1);
        info!(
            "PUB | {}/{}/{} = {}{}",
            self.device_id,
            node.id(),
            property.id(),
            payload,
            property.unit().unwrap_or("")
        );
    }
}
