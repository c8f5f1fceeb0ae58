//! Content stream lifecycle events

use crate::value_objects::ContentStreamId;
use serde::{Deserialize, Serialize};

/// An empty content stream was created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentStreamWasCreated {
    /// The new stream
    pub content_stream_id: ContentStreamId,
}

/// A content stream was forked from another one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentStreamWasForked {
    /// The stream created by the fork
    pub new_content_stream_id: ContentStreamId,
    /// The stream whose edges are copied
    pub source_content_stream_id: ContentStreamId,
}

/// A content stream was removed together with its edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentStreamWasRemoved {
    /// The removed stream
    pub content_stream_id: ContentStreamId,
}
