//! Aggregate read models

mod node_aggregate;

pub use node_aggregate::NodeAggregate;
