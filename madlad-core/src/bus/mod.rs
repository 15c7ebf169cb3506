//! In-process dispatch bus.
//!
//! Rings are registered on a [`BusBuilder`] before anything is published;
//! [`BusBuilder::build`] freezes the registry into an immutable [`Bus`].
//! Delivery is synchronous: `publish` runs the target ring's handler on the
//! caller's stack and hands back its reply or error.

mod message;

pub use message::{Message, MessageKind, Payload};

use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

const TARGET: &str = "madlad::bus";

/// A subsystem reachable through the bus
pub trait Ring: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(&self, bus: &Bus, message: Message) -> Result<Payload>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("no ring registered as '{target}'")]
    Unregistered { target: String },

    #[error("ring '{ring}' does not handle {kind} messages")]
    Unhandled { ring: String, kind: MessageKind },

    #[error("ring '{ring}' is already registered")]
    DuplicateRing { ring: String },

    #[error("ring '{ring}' replied {found} where {expected} was expected")]
    UnexpectedReply {
        ring: String,
        expected: MessageKind,
        found: MessageKind,
    },
}

impl RoutingError {
    pub fn unhandled(ring: &str, message: &Message) -> Self {
        RoutingError::Unhandled {
            ring: ring.to_string(),
            kind: message.kind,
        }
    }
}

#[derive(Default)]
pub struct BusBuilder {
    rings: Vec<Arc<dyn Ring>>,
}

impl BusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, ring: Arc<dyn Ring>) -> Result<Self, RoutingError> {
        if self.rings.iter().any(|r| r.name() == ring.name()) {
            return Err(RoutingError::DuplicateRing {
                ring: ring.name().to_string(),
            });
        }
        self.rings.push(ring);
        Ok(self)
    }

    pub fn build(self) -> Bus {
        let index = self
            .rings
            .iter()
            .enumerate()
            .map(|(i, ring)| (ring.name(), i))
            .collect();
        Bus {
            rings: self.rings,
            index,
        }
    }
}

/// Immutable ring registry
pub struct Bus {
    rings: Vec<Arc<dyn Ring>>,
    index: HashMap<&'static str, usize>,
}

impl Bus {
    pub fn builder() -> BusBuilder {
        BusBuilder::new()
    }

    /// Ring names in registration order
    pub fn rings(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rings.iter().map(|ring| ring.name())
    }

    pub fn has_ring(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn publish(&self, message: Message) -> Result<Payload> {
        let ring = self
            .index
            .get(message.target)
            .map(|&i| &self.rings[i])
            .ok_or_else(|| RoutingError::Unregistered {
                target: message.target.to_string(),
            })?;
        debug!(
            target: TARGET,
            source = message.source,
            target_ring = message.target,
            kind = %message.kind,
            "publish"
        );
        ring.handle(self, message)
    }

    /// Publish and insist on a reply of kind `expected`
    pub fn request(
        &self,
        source: &'static str,
        target: &'static str,
        payload: Payload,
        expected: MessageKind,
    ) -> Result<Payload> {
        let reply = self.publish(Message::new(source, target, payload))?;
        if reply.kind() != expected {
            return Err(RoutingError::UnexpectedReply {
                ring: target.to_string(),
                expected,
                found: reply.kind(),
            }
            .into());
        }
        Ok(reply)
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("rings", &self.rings().collect::<Vec<_>>())
            .finish()
    }
}
