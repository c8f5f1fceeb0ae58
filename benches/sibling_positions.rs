//! Benchmark: sibling insertion cost
//!
//! Appending never relabels; inserting in front of the same sibling halves one gap
//! until it is exhausted and forces relabeling of all siblings below the parent.

use cim_domain_content_graph::events::InterdimensionalSibling;
use cim_domain_content_graph::{
    ContentGraphEvent, ContentGraphProjection, ContentGraphStore, ContentStreamId,
    ContentStreamWasCreated, DimensionSpacePoint, EventLog, InMemoryEventLog,
    InterdimensionalSiblings, NodeAggregateClassification, NodeAggregateId,
    NodeAggregateWithNodeWasCreated, OriginDimensionSpacePoint,
    RootNodeAggregateWithNodeWasCreated, SerializedPropertyValues,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

fn content_stream() -> ContentStreamId {
    ContentStreamId::from("bench")
}

fn point() -> DimensionSpacePoint {
    DimensionSpacePoint::new([("language", "en")])
}

fn child(index: usize, succeeding: Option<NodeAggregateId>) -> ContentGraphEvent {
    NodeAggregateWithNodeWasCreated {
        content_stream_id: content_stream(),
        node_aggregate_id: NodeAggregateId::from(format!("child-{index}")),
        node_type_name: "Bench:Text".into(),
        origin_dimension_space_point: OriginDimensionSpacePoint::new([("language", "en")]),
        succeeding_siblings: InterdimensionalSiblings::new([InterdimensionalSibling::new(
            point(),
            succeeding,
        )]),
        parent_node_aggregate_id: NodeAggregateId::from("root"),
        node_name: None,
        initial_property_values: SerializedPropertyValues::new(),
        node_aggregate_classification: NodeAggregateClassification::Regular,
    }
    .into()
}

/// Bootstrap events followed by `count` children; `prepend` inserts each child right
/// behind the first one instead of appending
fn events(count: usize, prepend: bool) -> Vec<ContentGraphEvent> {
    let mut events: Vec<ContentGraphEvent> = vec![
        ContentStreamWasCreated {
            content_stream_id: content_stream(),
        }
        .into(),
        RootNodeAggregateWithNodeWasCreated {
            content_stream_id: content_stream(),
            node_aggregate_id: NodeAggregateId::from("root"),
            node_type_name: "Bench:Root".into(),
            covered_dimension_space_points: [point()].into_iter().collect(),
            node_aggregate_classification: NodeAggregateClassification::Root,
        }
        .into(),
    ];
    for index in 0..count {
        let succeeding = (prepend && index > 1).then(|| NodeAggregateId::from(format!("child-{}", index - 1)));
        events.push(child(index, succeeding));
    }
    events
}

fn project(runtime: &tokio::runtime::Runtime, events: Vec<ContentGraphEvent>) -> usize {
    runtime.block_on(async {
        let log = InMemoryEventLog::new();
        log.append(events).await.unwrap();
        let projection = ContentGraphProjection::with_store(ContentGraphStore::new());
        projection.catch_up(&log).await.unwrap()
    })
}

fn bench_sibling_insertion(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("sibling_insertion");
    for count in [16usize, 64, 256] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("append", count), &count, |b, &count| {
            b.iter(|| project(&runtime, events(count, false)))
        });
        group.bench_with_input(BenchmarkId::new("insert_before", count), &count, |b, &count| {
            b.iter(|| project(&runtime, events(count, true)))
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(5))
        .sample_size(30);
    targets = bench_sibling_insertion
}
criterion_main!(benches);
