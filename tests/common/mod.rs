//! Shared fixtures for the integration tests

#![allow(dead_code)]

use cim_domain_content_graph::{
    ContentDimensionConfig, ContentGraph, ContentGraphCommand, ContentGraphCommandHandler,
    ContentGraphEvent, ContentGraphProjection, ContentGraphStore, ContentStreamId, CommandResult,
    DimensionSpacePoint, DimensionSpacePointSet, EventLog, InMemoryEventLog, InMemoryNodeTypeSchema,
    InterDimensionalVariationGraph, NodeAggregateCommandHandler, NodeAggregateId,
    NodeTypeDefinitions, OriginDimensionSpacePoint, ProjectionConfig,
};
use serde_json::json;
use std::sync::Arc;

/// Languages: `en` is the fallback of `de` and `fr`, `en_US` specializes `en`; `it` stands alone
pub const LANGUAGES: &str = r#"{
    "dimensions": {
        "language": {
            "values": {
                "en": {
                    "specializations": {
                        "de": {},
                        "fr": {},
                        "en_US": {}
                    }
                },
                "it": {}
            }
        }
    }
}"#;

pub fn node_types() -> NodeTypeDefinitions {
    NodeTypeDefinitions::from_json(
        &json!({
            "Acme:Root": { "root": true },
            "Acme:Content": { "abstract": true },
            "Acme:Text": {
                "allowed_child_node_types": [],
                "properties": { "text": { "default_value": "" } }
            },
            "Acme:Collection": { "allowed_child_node_types": ["Acme:Text"] },
            "Acme:Document": {
                "allowed_child_node_types": ["Acme:Document"],
                "tethered_child_nodes": {
                    "main": { "node_type": "Acme:Collection" },
                    "footer": {
                        "node_type": "Acme:Collection",
                        "allowed_child_node_types": []
                    }
                },
                "properties": { "title": { "default_value": "Untitled" }, "uriPath": {} },
                "references": ["related"]
            },
            "Acme:Page": {
                "allowed_child_node_types": ["Acme:Document", "Acme:Page"],
                "properties": { "title": {} }
            }
        })
        .to_string(),
    )
    .expect("node types are valid")
}

pub fn cs() -> ContentStreamId {
    ContentStreamId::from("cs-identifier")
}

pub fn id(value: &str) -> NodeAggregateId {
    NodeAggregateId::from(value)
}

pub fn lang(value: &str) -> DimensionSpacePoint {
    DimensionSpacePoint::new([("language", value)])
}

pub fn origin(value: &str) -> OriginDimensionSpacePoint {
    OriginDimensionSpacePoint::new([("language", value)])
}

pub fn points(values: &[&str]) -> DimensionSpacePointSet {
    values.iter().map(|value| lang(value)).collect()
}

pub const ROOT: &str = "lady-eleonode-rootford";

/// Event log, projection, read API and command handler wired together
pub struct Harness {
    pub log: InMemoryEventLog,
    pub store: ContentGraphStore,
    pub projection: ContentGraphProjection,
    pub graph: ContentGraph,
    pub handler: NodeAggregateCommandHandler,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ProjectionConfig::default())
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        let dimensions = ContentDimensionConfig::from_json(LANGUAGES).expect("dimensions are valid");
        let oracle = Arc::new(
            InterDimensionalVariationGraph::new(&dimensions).expect("dimension space is valid"),
        );
        let store = ContentGraphStore::new();
        let graph = ContentGraph::new(store.clone());
        let projection =
            ContentGraphProjection::new(store.clone(), config).expect("config is valid");
        let handler = NodeAggregateCommandHandler::new(
            graph.clone(),
            Arc::new(InMemoryNodeTypeSchema::new(node_types())),
            oracle,
        );
        Self {
            log: InMemoryEventLog::new(),
            store,
            projection,
            graph,
            handler,
        }
    }

    /// Append events to the log and catch up
    pub async fn record(&self, events: Vec<ContentGraphEvent>) {
        self.log.append(events).await.expect("events are appended");
        self.projection
            .catch_up(&self.log)
            .await
            .expect("events are applied");
    }

    /// Handle a command, record its events and catch up
    pub async fn execute(&self, command: ContentGraphCommand) -> CommandResult<Vec<ContentGraphEvent>> {
        let events = self.handler.handle(command).await?;
        self.record(events.clone()).await;
        Ok(events)
    }

    /// A content stream with the root aggregate
    pub async fn with_root(&self) {
        self.execute(ContentGraphCommand::CreateContentStream {
            content_stream_id: cs(),
        })
        .await
        .expect("content stream is created");
        self.execute(ContentGraphCommand::CreateRootNodeAggregateWithNode {
            content_stream_id: cs(),
            node_aggregate_id: id(ROOT),
            node_type_name: "Acme:Root".into(),
        })
        .await
        .expect("root is created");
    }
}
