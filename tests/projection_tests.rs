//! Content graph projection integration tests
//!
//! Events are recorded directly, bypassing command validation, and observed through the
//! read API.

mod common;

use chrono::Utc;
use cim_domain_content_graph::{
    ApplyOutcome, ContentGraphEvent, ContentStreamId, ContentStreamWasCreated,
    ContentStreamWasForked, ContentStreamWasRemoved, EventEnvelope, EventId, EventLog,
    InterdimensionalSiblings, NodeAggregateClassification, NodeAggregateNameWasChanged,
    NodeAggregateWasDisabled, NodeAggregateWasEnabled, NodeAggregateWasMoved,
    NodeAggregateWasRemoved, RootNodeAggregateDimensionsWereUpdated,
    NodeAggregateWithNodeWasCreated, NodePropertiesWereSet, NodeReferenceToWrite,
    NodeReferencesWereSet, NodeSpecializationVariantWasCreated, ProjectionConfig,
    ProjectionError, RootNodeAggregateWithNodeWasCreated, SequenceNumber,
    SerializedPropertyValues, VisibilityConstraints,
};
use cim_domain_content_graph::events::InterdimensionalSibling;
use cim_domain_content_graph::infrastructure::{ContentGraphStore, TablesSnapshot};
use cim_domain_content_graph::{ContentGraph, ContentGraphProjection};
use common::*;
use serde_json::json;

fn stream_created(content_stream_id: &ContentStreamId) -> ContentGraphEvent {
    ContentStreamWasCreated {
        content_stream_id: content_stream_id.clone(),
    }
    .into()
}

fn root_created() -> ContentGraphEvent {
    RootNodeAggregateWithNodeWasCreated {
        content_stream_id: cs(),
        node_aggregate_id: id(ROOT),
        node_type_name: "Acme:Root".into(),
        covered_dimension_space_points: points(&["en", "de", "fr", "en_US", "it"]),
        node_aggregate_classification: NodeAggregateClassification::Root,
    }
    .into()
}

fn node_created(
    node: &str,
    parent: &str,
    origin_value: &str,
    visible_in: &[&str],
    succeeding: Option<&str>,
    name: Option<&str>,
) -> ContentGraphEvent {
    NodeAggregateWithNodeWasCreated {
        content_stream_id: cs(),
        node_aggregate_id: id(node),
        node_type_name: "Acme:Text".into(),
        origin_dimension_space_point: origin(origin_value),
        succeeding_siblings: InterdimensionalSiblings::new(
            visible_in
                .iter()
                .map(|point| InterdimensionalSibling::new(lang(point), succeeding.map(id))),
        ),
        parent_node_aggregate_id: id(parent),
        node_name: name.map(Into::into),
        initial_property_values: SerializedPropertyValues::new().with("text", json!(node)),
        node_aggregate_classification: NodeAggregateClassification::Regular,
    }
    .into()
}

fn properties_set(content_stream_id: &ContentStreamId, node: &str, text: &str) -> ContentGraphEvent {
    NodePropertiesWereSet {
        content_stream_id: content_stream_id.clone(),
        node_aggregate_id: id(node),
        origin_dimension_space_point: origin("en"),
        property_values: SerializedPropertyValues::new().with("text", json!(text)),
        properties_to_unset: Vec::new(),
    }
    .into()
}

fn disabled(node: &str, affected: &[&str]) -> ContentGraphEvent {
    NodeAggregateWasDisabled {
        content_stream_id: cs(),
        node_aggregate_id: id(node),
        affected_dimension_space_points: points(affected),
    }
    .into()
}

fn enabled(node: &str, affected: &[&str]) -> ContentGraphEvent {
    NodeAggregateWasEnabled {
        content_stream_id: cs(),
        node_aggregate_id: id(node),
        affected_dimension_space_points: points(affected),
    }
    .into()
}

fn text_in(graph: &ContentGraph, content_stream_id: &ContentStreamId, node: &str) -> Option<serde_json::Value> {
    graph
        .subgraph(content_stream_id, &lang("en"), VisibilityConstraints::Frontend)
        .find_node_by_id(&id(node))
        .and_then(|node| node.properties.get("text").cloned())
}

fn child_ids(graph: &ContentGraph, point: &str, parent: &str) -> Vec<String> {
    graph
        .subgraph(&cs(), &lang(point), VisibilityConstraints::WithoutRestrictions)
        .find_child_nodes(&id(parent))
        .into_iter()
        .map(|node| node.node_aggregate_id.to_string())
        .collect()
}

fn descendant_ids(graph: &ContentGraph, point: &str, visibility: VisibilityConstraints) -> Vec<String> {
    graph
        .subgraph(&cs(), &lang(point), visibility)
        .find_descendant_nodes(&id(ROOT))
        .into_iter()
        .map(|node| node.node_aggregate_id.to_string())
        .collect()
}

fn ids(nodes: Vec<cim_domain_content_graph::Node>) -> Vec<String> {
    nodes
        .into_iter()
        .map(|node| node.node_aggregate_id.to_string())
        .collect()
}

async fn with_root(harness: &Harness) {
    harness
        .record(vec![stream_created(&cs()), root_created()])
        .await;
}

#[tokio::test]
async fn test_redelivered_event_is_not_applied_twice() {
    let harness = Harness::new();
    with_root(&harness).await;
    let envelopes = harness
        .log
        .append(vec![node_created("nody", ROOT, "en", &["en"], None, None)])
        .await
        .unwrap();

    assert_eq!(
        harness.projection.apply(&envelopes[0]).await.unwrap(),
        ApplyOutcome::Applied
    );
    let before = harness.store.snapshot_tables();

    assert_eq!(
        harness.projection.apply(&envelopes[0]).await.unwrap(),
        ApplyOutcome::AlreadyApplied
    );
    assert_eq!(harness.store.snapshot_tables(), before);
    assert_eq!(harness.projection.checkpoint().sequence_number, Some(SequenceNumber::new(3)));
}

#[tokio::test]
async fn test_full_replay_matches_incremental_application() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![
            node_created("a", ROOT, "en", &["en", "de", "fr"], None, Some("a")),
            node_created("b", "a", "en", &["en"], None, None),
            node_created("c", "a", "en", &["en"], Some("b"), None),
            properties_set(&cs(), "b", "changed"),
            disabled("a", &["de"]),
            ContentStreamWasForked {
                new_content_stream_id: ContentStreamId::from("user-cs"),
                source_content_stream_id: cs(),
            }
            .into(),
            properties_set(&ContentStreamId::from("user-cs"), "a", "user"),
        ])
        .await;
    let incremental = harness.store.snapshot_tables();

    harness.projection.reset().await;
    assert_eq!(harness.projection.status().node_count, 0);
    harness.projection.catch_up(&harness.log).await.unwrap();

    assert_eq!(harness.store.snapshot_tables(), incremental);
}

#[tokio::test]
async fn test_sibling_positions_stay_unique_when_gaps_are_exhausted() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![node_created("n0", ROOT, "en", &["en"], None, None)])
        .await;

    // every insert goes right behind n0, halving the same gap until it is exhausted
    let mut expected = vec!["n0".to_string()];
    for i in 1..12 {
        let node = format!("n{i}");
        let before = expected[1..].first().cloned();
        harness
            .record(vec![node_created(
                &node,
                ROOT,
                "en",
                &["en"],
                before.as_deref(),
                None,
            )])
            .await;
        expected.insert(1, node);
    }

    assert_eq!(child_ids(&harness.graph, "en", ROOT), expected);

    let tables = harness.store.read();
    let mut positions: Vec<i64> = tables
        .hierarchy_edges_in(&cs())
        .filter(|edge| !edge.parent_node_anchor.is_root_edge())
        .map(|edge| edge.position)
        .collect();
    let total = positions.len();
    positions.sort_unstable();
    positions.dedup();
    assert_eq!(positions.len(), total);
}

#[tokio::test]
async fn test_copy_on_write_isolates_forked_streams() {
    let harness = Harness::new();
    with_root(&harness).await;
    let user_cs = ContentStreamId::from("user-cs");
    let review_cs = ContentStreamId::from("review-cs");
    harness
        .record(vec![
            node_created("nody", ROOT, "en", &["en"], None, None),
            ContentStreamWasForked {
                new_content_stream_id: user_cs.clone(),
                source_content_stream_id: cs(),
            }
            .into(),
            properties_set(&user_cs, "nody", "user edit"),
        ])
        .await;

    assert_eq!(text_in(&harness.graph, &cs(), "nody"), Some(json!("nody")));
    assert_eq!(text_in(&harness.graph, &user_cs, "nody"), Some(json!("user edit")));

    harness
        .record(vec![
            properties_set(&cs(), "nody", "live edit"),
            ContentStreamWasForked {
                new_content_stream_id: review_cs.clone(),
                source_content_stream_id: user_cs.clone(),
            }
            .into(),
        ])
        .await;

    assert_eq!(text_in(&harness.graph, &cs(), "nody"), Some(json!("live edit")));
    assert_eq!(text_in(&harness.graph, &user_cs, "nody"), Some(json!("user edit")));
    assert_eq!(text_in(&harness.graph, &review_cs, "nody"), Some(json!("user edit")));
}

#[tokio::test]
async fn test_hide_then_show_restores_visibility_of_a_changed_subtree() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![
            node_created("a", ROOT, "en", &["en", "de"], None, None),
            node_created("b", "a", "en", &["en", "de"], None, None),
        ])
        .await;
    let visible_before = descendant_ids(&harness.graph, "en", VisibilityConstraints::Frontend);
    assert_eq!(visible_before, vec!["a", "b"]);

    harness.record(vec![disabled("a", &["en", "de"])]).await;
    assert!(descendant_ids(&harness.graph, "en", VisibilityConstraints::Frontend).is_empty());

    harness
        .record(vec![node_created("c", "b", "en", &["en", "de"], None, None)])
        .await;
    assert!(descendant_ids(&harness.graph, "de", VisibilityConstraints::Frontend).is_empty());

    harness.record(vec![enabled("a", &["en", "de"])]).await;
    assert_eq!(
        descendant_ids(&harness.graph, "en", VisibilityConstraints::Frontend),
        vec!["a", "b", "c"]
    );
    assert_eq!(
        descendant_ids(&harness.graph, "de", VisibilityConstraints::Frontend),
        vec!["a", "b", "c"]
    );
    assert_eq!(harness.projection.status().restriction_edge_count, 0);
}

#[tokio::test]
async fn test_specialization_scenario() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![
            node_created("a", ROOT, "en", &["en", "de"], None, Some("a")),
            node_created("b", "a", "en", &["en"], None, Some("b")),
            NodeAggregateNameWasChanged {
                content_stream_id: cs(),
                node_aggregate_id: id("b"),
                new_node_name: "renamed".into(),
            }
            .into(),
            NodeSpecializationVariantWasCreated {
                content_stream_id: cs(),
                node_aggregate_id: id("a"),
                source_origin: origin("en"),
                specialization_origin: origin("fr"),
                specialization_siblings: InterdimensionalSiblings::append_to(&points(&["fr"])),
            }
            .into(),
        ])
        .await;

    let a = harness.graph.find_node_aggregate_by_id(&cs(), &id("a")).unwrap();
    assert_eq!(a.nodes().len(), 2);
    assert!(a.occupies_dimension_space_point(&origin("en")));
    assert!(a.occupies_dimension_space_point(&origin("fr")));

    let in_fr = harness
        .graph
        .subgraph(&cs(), &lang("fr"), VisibilityConstraints::Frontend);
    assert_eq!(
        in_fr.find_node_by_id(&id("a")).unwrap().origin_dimension_space_point,
        origin("fr")
    );
    assert!(in_fr.find_node_by_id(&id("b")).is_none());

    let in_de = harness
        .graph
        .subgraph(&cs(), &lang("de"), VisibilityConstraints::Frontend);
    assert_eq!(
        in_de.find_node_by_id(&id("a")).unwrap().origin_dimension_space_point,
        origin("en")
    );

    let in_en = harness
        .graph
        .subgraph(&cs(), &lang("en"), VisibilityConstraints::Frontend);
    let b = in_en.find_node_by_id(&id("b")).unwrap();
    assert_eq!(b.node_name, Some("renamed".into()));
    let b_aggregate = harness.graph.find_node_aggregate_by_id(&cs(), &id("b")).unwrap();
    assert_eq!(b_aggregate.nodes().len(), 1);
}

#[tokio::test]
async fn test_restricted_reads_hide_descendants_of_disabled_nodes() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![
            node_created("a", ROOT, "en", &["en", "de"], None, None),
            node_created("b", "a", "en", &["en"], None, None),
            disabled("a", &["en"]),
        ])
        .await;

    assert!(!descendant_ids(&harness.graph, "en", VisibilityConstraints::Frontend)
        .contains(&"b".to_string()));
    assert_eq!(
        descendant_ids(&harness.graph, "en", VisibilityConstraints::WithoutRestrictions),
        vec!["a", "b"]
    );
    assert_eq!(
        descendant_ids(&harness.graph, "de", VisibilityConstraints::Frontend),
        vec!["a"]
    );

    let a = harness.graph.find_node_aggregate_by_id(&cs(), &id("a")).unwrap();
    assert!(a.disables_dimension_space_point(&lang("en")));
    assert!(!a.disables_dimension_space_point(&lang("de")));
}

#[tokio::test]
async fn test_compatibility_skips_advance_the_checkpoint() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .log
        .append_raw("NodeWasMoved", json!({ "whatever": true }))
        .await
        .unwrap();
    harness
        .log
        .append_raw("WorkspaceWasRebased", json!({}))
        .await
        .unwrap();
    let before = harness.projection.status();

    assert_eq!(harness.projection.catch_up(&harness.log).await.unwrap(), 2);
    let after = harness.projection.status();
    assert_eq!(after.checkpoint.sequence_number, Some(SequenceNumber::new(4)));
    assert_eq!(after.node_count, before.node_count);
    assert_eq!(after.hierarchy_edge_count, before.hierarchy_edge_count);
}

#[tokio::test]
async fn test_unknown_event_type_stops_the_projection() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .log
        .append_raw("NodeWasTeleported", json!({}))
        .await
        .unwrap();

    let error = harness.projection.catch_up(&harness.log).await.unwrap_err();
    assert!(matches!(error, ProjectionError::UnsupportedEventType(t) if t == "NodeWasTeleported"));
    assert_eq!(
        harness.projection.checkpoint().sequence_number,
        Some(SequenceNumber::new(2))
    );
}

#[tokio::test]
async fn test_malformed_payload_is_a_decoding_error() {
    let harness = Harness::new();
    harness
        .log
        .append_raw("ContentStreamWasCreated", json!({ "unexpected": 1 }))
        .await
        .unwrap();

    let error = harness.projection.catch_up(&harness.log).await.unwrap_err();
    assert!(matches!(error, ProjectionError::EventDecoding { .. }));
}

#[tokio::test]
async fn test_sequence_gaps_are_rejected_unless_allowed() {
    let (event_type, payload) = stream_created(&cs()).into_parts().unwrap();
    let envelope = EventEnvelope {
        sequence_number: SequenceNumber::new(5),
        event_id: EventId::new(),
        recorded_at: Utc::now(),
        event_type,
        payload,
    };

    let strict = Harness::new();
    let error = strict.projection.apply(&envelope).await.unwrap_err();
    assert!(matches!(error, ProjectionError::SequenceGap { .. }));

    let lenient = Harness::with_config(ProjectionConfig {
        allow_sequence_gaps: true,
        ..ProjectionConfig::default()
    });
    assert_eq!(
        lenient.projection.apply(&envelope).await.unwrap(),
        ApplyOutcome::Applied
    );
    assert!(lenient.graph.has_content_stream(&cs()));
}

#[tokio::test]
async fn test_failed_event_rolls_back_and_keeps_the_checkpoint() {
    let harness = Harness::new();
    with_root(&harness).await;
    let before = harness.store.snapshot_tables();
    harness
        .log
        .append(vec![node_created("orphan", "nobody", "en", &["en"], None, None)])
        .await
        .unwrap();

    let error = harness.projection.catch_up(&harness.log).await.unwrap_err();
    assert!(matches!(error, ProjectionError::EventCouldNotBeApplied { .. }));
    assert_eq!(harness.store.snapshot_tables(), before);
}

#[tokio::test]
async fn test_restart_from_persisted_snapshot() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![node_created("a", ROOT, "en", &["en"], None, None)])
        .await;
    let persisted = harness.store.export_snapshot().to_json().unwrap();

    harness
        .log
        .append(vec![node_created("b", "a", "en", &["en"], None, None)])
        .await
        .unwrap();

    let restored = ContentGraphStore::from_snapshot(TablesSnapshot::from_json(&persisted).unwrap());
    let projection = ContentGraphProjection::with_store(restored.clone());
    assert_eq!(projection.catch_up(&harness.log).await.unwrap(), 1);

    let graph = ContentGraph::new(restored);
    assert_eq!(child_ids(&graph, "en", "a"), vec!["b"]);
    assert_eq!(child_ids(&graph, "en", ROOT), vec!["a"]);
}

#[tokio::test]
async fn test_removal_collects_orphaned_nodes_and_references() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![
            node_created("a", ROOT, "en", &["en", "de"], None, None),
            node_created("b", "a", "en", &["en", "de"], None, None),
            node_created("target", ROOT, "en", &["en", "de"], None, None),
            NodeReferencesWereSet {
                content_stream_id: cs(),
                source_node_aggregate_id: id("b"),
                source_origin_dimension_space_point: origin("en"),
                reference_name: "related".into(),
                references: vec![NodeReferenceToWrite::to(id("target"))],
            }
            .into(),
        ])
        .await;
    assert_eq!(harness.projection.status().reference_edge_count, 1);

    harness
        .record(vec![NodeAggregateWasRemoved {
            content_stream_id: cs(),
            node_aggregate_id: id("a"),
            affected_occupied_dimension_space_points: [origin("en")].into_iter().collect(),
            affected_covered_dimension_space_points: points(&["en", "de"]),
        }
        .into()])
        .await;

    assert!(harness.graph.find_node_aggregate_by_id(&cs(), &id("a")).is_none());
    assert!(harness.graph.find_node_aggregate_by_id(&cs(), &id("b")).is_none());
    let status = harness.projection.status();
    assert_eq!(status.node_count, 2);
    assert_eq!(status.reference_edge_count, 0);
    assert!(harness
        .graph
        .subgraph(&cs(), &lang("en"), VisibilityConstraints::Frontend)
        .find_back_references(&id("target"))
        .is_empty());
}

#[tokio::test]
async fn test_removed_stream_keeps_shared_nodes() {
    let harness = Harness::new();
    with_root(&harness).await;
    let user_cs = ContentStreamId::from("user-cs");
    harness
        .record(vec![
            node_created("shared", ROOT, "en", &["en"], None, None),
            ContentStreamWasForked {
                new_content_stream_id: user_cs.clone(),
                source_content_stream_id: cs(),
            }
            .into(),
            properties_set(&user_cs, "shared", "only in user stream"),
        ])
        .await;
    assert_eq!(harness.projection.status().node_count, 3);

    harness
        .record(vec![ContentStreamWasRemoved {
            content_stream_id: user_cs.clone(),
        }
        .into()])
        .await;

    let status = harness.projection.status();
    assert_eq!(status.node_count, 2);
    assert_eq!(status.content_stream_count, 1);
    assert!(!harness.graph.has_content_stream(&user_cs));
    assert_eq!(text_in(&harness.graph, &cs(), "shared"), Some(json!("shared")));
}

#[tokio::test]
async fn test_preceding_siblings_are_nearest_first_after_a_move() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![
            node_created("a", ROOT, "en", &["en"], None, None),
            node_created("b", ROOT, "en", &["en"], None, None),
            node_created("c", ROOT, "en", &["en"], None, None),
            node_created("d", ROOT, "en", &["en"], None, None),
            NodeAggregateWasMoved {
                content_stream_id: cs(),
                node_aggregate_id: id("d"),
                new_parent_node_aggregate_id: None,
                succeeding_siblings: InterdimensionalSiblings::new([
                    InterdimensionalSibling::new(lang("en"), Some(id("b"))),
                ]),
            }
            .into(),
        ])
        .await;
    assert_eq!(child_ids(&harness.graph, "en", ROOT), vec!["a", "d", "b", "c"]);

    let subgraph = harness.graph.subgraph(
        &cs(),
        &lang("en"),
        VisibilityConstraints::WithoutRestrictions,
    );
    assert_eq!(ids(subgraph.find_preceding_sibling_nodes(&id("c"))), vec!["b", "d", "a"]);
    assert_eq!(ids(subgraph.find_preceding_sibling_nodes(&id("d"))), vec!["a"]);
    assert!(subgraph.find_preceding_sibling_nodes(&id("a")).is_empty());
    assert_eq!(ids(subgraph.find_succeeding_sibling_nodes(&id("a"))), vec!["d", "b", "c"]);
}

#[tokio::test]
async fn test_count_nodes_excludes_hidden_and_uncovered_nodes() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![
            node_created("a", ROOT, "en", &["en", "de"], None, None),
            node_created("b", "a", "en", &["en", "de"], None, None),
            node_created("c", "b", "en", &["en", "de"], None, None),
            node_created("english-only", ROOT, "en", &["en"], None, None),
            disabled("b", &["en"]),
        ])
        .await;

    let count = |point: &str, visibility| {
        harness
            .graph
            .subgraph(&cs(), &lang(point), visibility)
            .count_nodes()
    };
    assert_eq!(count("en", VisibilityConstraints::WithoutRestrictions), 5);
    assert_eq!(count("en", VisibilityConstraints::Frontend), 3);
    assert_eq!(count("de", VisibilityConstraints::Frontend), 4);
    assert_eq!(count("it", VisibilityConstraints::Frontend), 1);
}

#[tokio::test]
async fn test_child_nodes_are_filtered_by_type() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![
            node_created("text-1", ROOT, "en", &["en"], None, None),
            NodeAggregateWithNodeWasCreated {
                content_stream_id: cs(),
                node_aggregate_id: id("collection"),
                node_type_name: "Acme:Collection".into(),
                origin_dimension_space_point: origin("en"),
                succeeding_siblings: InterdimensionalSiblings::new([
                    InterdimensionalSibling::new(lang("en"), None),
                ]),
                parent_node_aggregate_id: id(ROOT),
                node_name: None,
                initial_property_values: SerializedPropertyValues::new(),
                node_aggregate_classification: NodeAggregateClassification::Regular,
            }
            .into(),
            node_created("text-2", ROOT, "en", &["en"], None, None),
        ])
        .await;

    let subgraph = harness
        .graph
        .subgraph(&cs(), &lang("en"), VisibilityConstraints::Frontend);
    assert_eq!(
        ids(subgraph.find_child_nodes_of_type(&id(ROOT), &["Acme:Text".into()])),
        vec!["text-1", "text-2"]
    );
    assert_eq!(
        ids(subgraph.find_child_nodes_of_type(&id(ROOT), &["Acme:Collection".into()])),
        vec!["collection"]
    );
    assert_eq!(
        ids(subgraph.find_child_nodes_of_type(
            &id(ROOT),
            &["Acme:Collection".into(), "Acme:Text".into()]
        )),
        vec!["text-1", "collection", "text-2"]
    );
    assert!(subgraph
        .find_child_nodes_of_type(&id(ROOT), &["Acme:Document".into()])
        .is_empty());
}

#[tokio::test]
async fn test_root_dimensions_update_adds_and_removes_coverage() {
    let harness = Harness::new();
    harness
        .record(vec![
            stream_created(&cs()),
            RootNodeAggregateWithNodeWasCreated {
                content_stream_id: cs(),
                node_aggregate_id: id(ROOT),
                node_type_name: "Acme:Root".into(),
                covered_dimension_space_points: points(&["en", "de"]),
                node_aggregate_classification: NodeAggregateClassification::Root,
            }
            .into(),
            node_created("a", ROOT, "en", &["en"], None, None),
        ])
        .await;
    let root_in = |point: &str| {
        harness
            .graph
            .subgraph(&cs(), &lang(point), VisibilityConstraints::Frontend)
            .find_node_by_id(&id(ROOT))
            .is_some()
    };
    assert!(root_in("de"));
    assert!(!root_in("it"));

    harness
        .record(vec![RootNodeAggregateDimensionsWereUpdated {
            content_stream_id: cs(),
            node_aggregate_id: id(ROOT),
            covered_dimension_space_points: points(&["en", "it"]),
        }
        .into()])
        .await;

    assert!(root_in("en"));
    assert!(root_in("it"));
    assert!(!root_in("de"));
    assert_eq!(child_ids(&harness.graph, "en", ROOT), vec!["a"]);
    assert!(child_ids(&harness.graph, "it", ROOT).is_empty());
    let root = harness
        .graph
        .find_node_aggregate_by_id(&cs(), &id(ROOT))
        .unwrap();
    assert_eq!(root.covered_dimension_space_points(), &points(&["en", "it"]));
}

#[tokio::test]
async fn test_restore_snapshot_into_running_projection() {
    let harness = Harness::new();
    with_root(&harness).await;
    harness
        .record(vec![node_created("a", ROOT, "en", &["en"], None, None)])
        .await;
    let persisted = harness.projection.snapshot().await.to_json().unwrap();
    let persisted_checkpoint = harness.projection.checkpoint();

    harness
        .record(vec![node_created("b", "a", "en", &["en"], None, None)])
        .await;
    assert_eq!(child_ids(&harness.graph, "en", "a"), vec!["b"]);

    harness
        .projection
        .restore(TablesSnapshot::from_json(&persisted).unwrap())
        .await;
    assert_eq!(harness.projection.checkpoint(), persisted_checkpoint);
    assert!(child_ids(&harness.graph, "en", "a").is_empty());

    assert_eq!(harness.projection.catch_up(&harness.log).await.unwrap(), 1);
    assert_eq!(child_ids(&harness.graph, "en", "a"), vec!["b"]);
    assert_eq!(child_ids(&harness.graph, "en", ROOT), vec!["a"]);
}
