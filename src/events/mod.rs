//! Content graph domain events
//!
//! Every event targets exactly one content stream, except the fork which names both
//! the source and the new stream.

mod content_stream_events;
mod dimension_events;
mod envelope;
mod node_events;
mod siblings;
mod variation_events;

pub use content_stream_events::*;
pub use dimension_events::*;
pub use envelope::{EventEnvelope, EventId, SequenceNumber};
pub use node_events::*;
pub use siblings::{InterdimensionalSibling, InterdimensionalSiblings};
pub use variation_events::*;
