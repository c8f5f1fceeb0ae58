//! Content graph command handlers
//!
//! Command handlers validate commands against the read model and emit events. They never
//! write to the tables; callers append the returned events to the event log and let the
//! projection catch up.

mod constraint_checker;
mod variation_resolver;

pub use constraint_checker::ConstraintChecker;
pub use variation_resolver::VariationResolver;

use crate::aggregate::NodeAggregate;
use crate::commands::{
    CommandError, CommandResult, ContentGraphCommand, RelationDistributionStrategy,
};
use crate::dimension::{
    DimensionSpacePoint, DimensionSpacePointSet, OriginDimensionSpacePoint, VariantType,
    VariationOracle,
};
use crate::domain_events::ContentGraphEvent;
use crate::events::{
    ContentStreamWasCreated, ContentStreamWasForked, ContentStreamWasRemoved,
    DimensionShineThroughWasAdded, DimensionSpacePointWasMoved, InterdimensionalSiblings,
    NodeAggregateNameWasChanged, NodeAggregateTypeWasChanged, NodeAggregateWasDisabled,
    NodeAggregateWasEnabled, NodeAggregateWasMoved, NodeAggregateWasRemoved,
    NodeAggregateWithNodeWasCreated, NodePropertiesWereSet, NodeReferencesWereSet,
    RootNodeAggregateWithNodeWasCreated,
};
use crate::node_types::NodeTypeSchema;
use crate::queries::ContentGraph;
use crate::value_objects::{
    ContentStreamId, NodeAggregateClassification, NodeAggregateId, NodeName,
    NodeReferenceToWrite, NodeTypeName, ReferenceName, SerializedPropertyValues,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trait for handling content graph commands
#[async_trait]
pub trait ContentGraphCommandHandler: Send + Sync {
    /// Validate a command and return the events it results in
    async fn handle(&self, command: ContentGraphCommand) -> CommandResult<Vec<ContentGraphEvent>>;
}

/// Tethered node to create below a parent
struct TetheredCreation<'a> {
    parent_node_aggregate_id: NodeAggregateId,
    parent_node_type_name: NodeTypeName,
    path: String,
    origin: &'a OriginDimensionSpacePoint,
    visibility: &'a DimensionSpacePointSet,
}

/// Command handler for content streams and node aggregates
pub struct NodeAggregateCommandHandler {
    checker: ConstraintChecker,
    resolver: VariationResolver,
}

impl NodeAggregateCommandHandler {
    /// Create a handler validating against `graph`
    pub fn new(
        graph: ContentGraph,
        schema: Arc<dyn NodeTypeSchema>,
        oracle: Arc<dyn VariationOracle>,
    ) -> Self {
        Self {
            checker: ConstraintChecker::new(graph.clone(), schema, oracle.clone()),
            resolver: VariationResolver::new(graph, oracle),
        }
    }

    pub fn constraint_checker(&self) -> &ConstraintChecker {
        &self.checker
    }

    pub fn variation_resolver(&self) -> &VariationResolver {
        &self.resolver
    }

    fn graph(&self) -> &ContentGraph {
        self.checker.graph()
    }

    fn schema(&self) -> &dyn NodeTypeSchema {
        self.checker.schema()
    }

    fn oracle(&self) -> &dyn VariationOracle {
        self.checker.oracle()
    }

    // content streams

    fn create_content_stream(
        &self,
        content_stream_id: ContentStreamId,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_not_exist(&content_stream_id)?;
        Ok(vec![ContentStreamWasCreated { content_stream_id }.into()])
    }

    fn fork_content_stream(
        &self,
        new_content_stream_id: ContentStreamId,
        source_content_stream_id: ContentStreamId,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&source_content_stream_id)?;
        self.checker.require_content_stream_to_not_exist(&new_content_stream_id)?;
        Ok(vec![ContentStreamWasForked {
            new_content_stream_id,
            source_content_stream_id,
        }
        .into()])
    }

    fn remove_content_stream(
        &self,
        content_stream_id: ContentStreamId,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        Ok(vec![ContentStreamWasRemoved { content_stream_id }.into()])
    }

    // creation

    fn create_root_node_aggregate(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        node_type_name: NodeTypeName,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        self.checker
            .require_node_aggregate_to_not_exist(&content_stream_id, &node_aggregate_id)?;
        self.checker.require_node_type(&node_type_name)?;
        self.checker.require_node_type_to_not_be_abstract(&node_type_name)?;
        self.checker.require_node_type_to_be_of_type_root(&node_type_name)?;
        self.checker
            .require_root_node_type_to_be_unoccupied(&content_stream_id, &node_type_name)?;

        let mut covered = DimensionSpacePointSet::empty();
        for generalization in self.oracle().root_generalizations().iter() {
            covered = covered.union(&self.oracle().specialization_set(generalization, true, None)?);
        }

        Ok(vec![RootNodeAggregateWithNodeWasCreated {
            content_stream_id,
            node_aggregate_id,
            node_type_name,
            covered_dimension_space_points: covered,
            node_aggregate_classification: NodeAggregateClassification::Root,
        }
        .into()])
    }

    #[allow(clippy::too_many_arguments)]
    fn create_node_aggregate(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        node_type_name: NodeTypeName,
        origin: OriginDimensionSpacePoint,
        parent_node_aggregate_id: NodeAggregateId,
        succeeding_sibling_node_aggregate_id: Option<NodeAggregateId>,
        node_name: Option<NodeName>,
        initial_property_values: SerializedPropertyValues,
        tethered_descendant_node_aggregate_ids: BTreeMap<String, NodeAggregateId>,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        self.checker.require_node_type(&node_type_name)?;
        self.checker.require_node_type_to_not_be_abstract(&node_type_name)?;
        self.checker.require_node_type_to_not_be_of_type_root(&node_type_name)?;
        self.checker
            .require_node_aggregate_to_not_exist(&content_stream_id, &node_aggregate_id)?;
        for tethered_id in tethered_descendant_node_aggregate_ids.values() {
            self.checker
                .require_node_aggregate_to_not_exist(&content_stream_id, tethered_id)?;
        }
        self.checker
            .require_dimension_space_point_to_exist(origin.as_dimension_space_point())?;
        for property_name in initial_property_values.names() {
            self.checker
                .require_property_to_be_declared(&node_type_name, property_name)?;
        }

        let parent = self
            .checker
            .require_project_node_aggregate(&content_stream_id, &parent_node_aggregate_id)?;
        self.checker.require_constraints_imposed_by_ancestors_to_be_met(
            &content_stream_id,
            &parent,
            &node_type_name,
        )?;
        self.checker.require_node_aggregate_to_cover_dimension_space_point(
            &parent,
            origin.as_dimension_space_point(),
        )?;
        let visibility = self.resolver.creation_visibility(&origin)?;
        self.checker
            .require_node_aggregate_to_cover_dimension_space_points(&parent, &visibility)?;

        if let Some(sibling) = &succeeding_sibling_node_aggregate_id {
            self.checker
                .require_project_node_aggregate(&content_stream_id, sibling)?;
        }
        if let Some(node_name) = &node_name {
            if let Some(parent_origin) =
                parent.occupation_by_covered(origin.as_dimension_space_point())
            {
                self.checker.require_node_name_to_be_unoccupied(
                    &content_stream_id,
                    node_name,
                    &parent_node_aggregate_id,
                    parent_origin,
                    &visibility,
                )?;
            }
            self.checker.require_node_name_to_be_uncovered(
                &content_stream_id,
                node_name,
                &parent_node_aggregate_id,
                None,
                &visibility,
            )?;
        }

        let succeeding_siblings = self.resolver.succeeding_siblings(
            &content_stream_id,
            None,
            succeeding_sibling_node_aggregate_id.as_ref(),
            origin.as_dimension_space_point(),
            &visibility,
        );
        let property_values = self
            .schema()
            .default_property_values(&node_type_name)
            .merge(&initial_property_values);

        let mut events: Vec<ContentGraphEvent> = vec![NodeAggregateWithNodeWasCreated {
            content_stream_id: content_stream_id.clone(),
            node_aggregate_id: node_aggregate_id.clone(),
            node_type_name: node_type_name.clone(),
            origin_dimension_space_point: origin.clone(),
            succeeding_siblings,
            parent_node_aggregate_id,
            node_name,
            initial_property_values: property_values,
            node_aggregate_classification: NodeAggregateClassification::Regular,
        }
        .into()];
        events.extend(self.tethered_descendant_events(
            &content_stream_id,
            TetheredCreation {
                parent_node_aggregate_id: node_aggregate_id,
                parent_node_type_name: node_type_name,
                path: String::new(),
                origin: &origin,
                visibility: &visibility,
            },
            &tethered_descendant_node_aggregate_ids,
            &BTreeMap::new(),
        ));
        Ok(events)
    }

    /// Creation events for the tethered descendants the parent's type declares,
    /// skipping names listed in `existing`
    fn tethered_descendant_events(
        &self,
        content_stream_id: &ContentStreamId,
        root: TetheredCreation<'_>,
        ids: &BTreeMap<String, NodeAggregateId>,
        existing: &BTreeMap<NodeName, NodeAggregateId>,
    ) -> Vec<ContentGraphEvent> {
        let mut events = Vec::new();
        let mut stack = vec![root];
        while let Some(creation) = stack.pop() {
            let mut children = Vec::new();
            for (name, child_type) in self
                .schema()
                .tethered_child_nodes(&creation.parent_node_type_name)
            {
                if creation.path.is_empty() && existing.contains_key(&name) {
                    continue;
                }
                let path = if creation.path.is_empty() {
                    name.to_string()
                } else {
                    format!("{}/{}", creation.path, name)
                };
                let child_id = ids.get(&path).cloned().unwrap_or_default();
                events.push(
                    NodeAggregateWithNodeWasCreated {
                        content_stream_id: content_stream_id.clone(),
                        node_aggregate_id: child_id.clone(),
                        node_type_name: child_type.clone(),
                        origin_dimension_space_point: creation.origin.clone(),
                        succeeding_siblings: InterdimensionalSiblings::append_to(
                            creation.visibility,
                        ),
                        parent_node_aggregate_id: creation.parent_node_aggregate_id.clone(),
                        node_name: Some(name),
                        initial_property_values: self.schema().default_property_values(&child_type),
                        node_aggregate_classification: NodeAggregateClassification::Tethered,
                    }
                    .into(),
                );
                children.push(TetheredCreation {
                    parent_node_aggregate_id: child_id,
                    parent_node_type_name: child_type,
                    path,
                    origin: creation.origin,
                    visibility: creation.visibility,
                });
            }
            children.reverse();
            stack.extend(children);
        }
        events
    }

    // modification

    fn change_node_aggregate_name(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        new_node_name: NodeName,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        let aggregate = self
            .checker
            .require_project_node_aggregate(&content_stream_id, &node_aggregate_id)?;
        self.checker.require_node_aggregate_to_not_be_root(&aggregate)?;
        self.checker.require_node_aggregate_to_not_be_tethered(&aggregate)?;
        for parent in self
            .graph()
            .find_parent_node_aggregates(&content_stream_id, &node_aggregate_id)
        {
            self.checker.require_node_name_to_be_uncovered(
                &content_stream_id,
                &new_node_name,
                parent.node_aggregate_id(),
                Some(&node_aggregate_id),
                aggregate.covered_dimension_space_points(),
            )?;
        }
        Ok(vec![NodeAggregateNameWasChanged {
            content_stream_id,
            node_aggregate_id,
            new_node_name,
        }
        .into()])
    }

    fn set_node_properties(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        origin: OriginDimensionSpacePoint,
        property_values: SerializedPropertyValues,
        properties_to_unset: Vec<String>,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        let aggregate = self
            .checker
            .require_project_node_aggregate(&content_stream_id, &node_aggregate_id)?;
        self.checker
            .require_node_aggregate_to_occupy_dimension_space_point(&aggregate, &origin)?;
        for property_name in property_values.names().chain(properties_to_unset.iter()) {
            self.checker
                .require_property_to_be_declared(aggregate.node_type_name(), property_name)?;
        }
        Ok(vec![NodePropertiesWereSet {
            content_stream_id,
            node_aggregate_id,
            origin_dimension_space_point: origin,
            property_values,
            properties_to_unset,
        }
        .into()])
    }

    fn set_node_references(
        &self,
        content_stream_id: ContentStreamId,
        source_node_aggregate_id: NodeAggregateId,
        source_origin: OriginDimensionSpacePoint,
        reference_name: ReferenceName,
        references: Vec<NodeReferenceToWrite>,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        let source = self
            .checker
            .require_project_node_aggregate(&content_stream_id, &source_node_aggregate_id)?;
        self.checker
            .require_node_aggregate_to_occupy_dimension_space_point(&source, &source_origin)?;
        self.checker
            .require_reference_to_be_declared(source.node_type_name(), &reference_name)?;
        for reference in &references {
            self.checker.require_project_node_aggregate(
                &content_stream_id,
                &reference.target_node_aggregate_id,
            )?;
        }
        Ok(vec![NodeReferencesWereSet {
            content_stream_id,
            source_node_aggregate_id,
            source_origin_dimension_space_point: source_origin,
            reference_name,
            references,
        }
        .into()])
    }

    fn change_node_aggregate_type(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        new_node_type_name: NodeTypeName,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        self.checker.require_node_type(&new_node_type_name)?;
        self.checker.require_node_type_to_not_be_abstract(&new_node_type_name)?;
        let aggregate = self
            .checker
            .require_project_node_aggregate(&content_stream_id, &node_aggregate_id)?;
        if aggregate.is_root() {
            self.checker.require_node_type_to_be_of_type_root(&new_node_type_name)?;
        } else {
            self.checker
                .require_node_type_to_not_be_of_type_root(&new_node_type_name)?;
            self.checker.require_node_aggregate_to_not_be_tethered(&aggregate)?;
        }
        for parent in self
            .graph()
            .find_parent_node_aggregates(&content_stream_id, &node_aggregate_id)
        {
            self.checker.require_constraints_imposed_by_ancestors_to_be_met(
                &content_stream_id,
                &parent,
                &new_node_type_name,
            )?;
        }
        self.checker.require_existing_children_to_be_allowed(
            &content_stream_id,
            &aggregate,
            &new_node_type_name,
        )?;

        let mut events: Vec<ContentGraphEvent> = vec![NodeAggregateTypeWasChanged {
            content_stream_id: content_stream_id.clone(),
            node_aggregate_id: node_aggregate_id.clone(),
            new_node_type_name: new_node_type_name.clone(),
        }
        .into()];

        if !aggregate.is_root() {
            let existing: BTreeMap<NodeName, NodeAggregateId> = self
                .graph()
                .find_tethered_child_node_aggregates(&content_stream_id, &node_aggregate_id)
                .into_iter()
                .filter_map(|child| {
                    child
                        .node_name()
                        .cloned()
                        .map(|name| (name, child.node_aggregate_id().clone()))
                })
                .collect();
            if let Some(origin) = aggregate.occupied_dimension_space_points().iter().next() {
                events.extend(self.tethered_descendant_events(
                    &content_stream_id,
                    TetheredCreation {
                        parent_node_aggregate_id: node_aggregate_id,
                        parent_node_type_name: new_node_type_name,
                        path: String::new(),
                        origin,
                        visibility: aggregate.covered_dimension_space_points(),
                    },
                    &BTreeMap::new(),
                    &existing,
                ));
            }
        }
        Ok(events)
    }

    // visibility and removal

    fn disable_node_aggregate(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        point: DimensionSpacePoint,
        strategy: RelationDistributionStrategy,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        let aggregate =
            self.require_covering_aggregate(&content_stream_id, &node_aggregate_id, &point)?;
        self.checker
            .require_node_aggregate_to_not_disable_dimension_space_point(&aggregate, &point)?;
        let affected = self
            .resolver
            .affected_dimension_space_points(&aggregate, &point, strategy)?;
        Ok(vec![NodeAggregateWasDisabled {
            content_stream_id,
            node_aggregate_id,
            affected_dimension_space_points: affected,
        }
        .into()])
    }

    fn enable_node_aggregate(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        point: DimensionSpacePoint,
        strategy: RelationDistributionStrategy,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        let aggregate =
            self.require_covering_aggregate(&content_stream_id, &node_aggregate_id, &point)?;
        self.checker
            .require_node_aggregate_to_disable_dimension_space_point(&aggregate, &point)?;
        let affected = self
            .resolver
            .affected_dimension_space_points(&aggregate, &point, strategy)?
            .intersection(aggregate.disabled_dimension_space_points());
        Ok(vec![NodeAggregateWasEnabled {
            content_stream_id,
            node_aggregate_id,
            affected_dimension_space_points: affected,
        }
        .into()])
    }

    fn remove_node_aggregate(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        point: DimensionSpacePoint,
        strategy: RelationDistributionStrategy,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        let aggregate =
            self.require_covering_aggregate(&content_stream_id, &node_aggregate_id, &point)?;
        self.checker.require_node_aggregate_to_not_be_tethered(&aggregate)?;
        if aggregate.is_root() && strategy != RelationDistributionStrategy::GatherAll {
            return Err(CommandError::NodeAggregateIsRoot(node_aggregate_id));
        }
        let affected_covered = self
            .resolver
            .affected_dimension_space_points(&aggregate, &point, strategy)?;
        let affected_occupied = aggregate
            .occupied_dimension_space_points()
            .iter()
            .filter(|origin| affected_covered.contains(origin.as_dimension_space_point()))
            .cloned()
            .collect();
        Ok(vec![NodeAggregateWasRemoved {
            content_stream_id,
            node_aggregate_id,
            affected_occupied_dimension_space_points: affected_occupied,
            affected_covered_dimension_space_points: affected_covered,
        }
        .into()])
    }

    fn require_covering_aggregate(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
        point: &DimensionSpacePoint,
    ) -> CommandResult<NodeAggregate> {
        self.checker.require_content_stream_to_exist(content_stream_id)?;
        self.checker.require_dimension_space_point_to_exist(point)?;
        let aggregate = self
            .checker
            .require_project_node_aggregate(content_stream_id, node_aggregate_id)?;
        self.checker
            .require_node_aggregate_to_cover_dimension_space_point(&aggregate, point)?;
        Ok(aggregate)
    }

    // variation and structure

    fn create_node_variant(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        source_origin: OriginDimensionSpacePoint,
        target_origin: OriginDimensionSpacePoint,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        self.checker
            .require_dimension_space_point_to_exist(source_origin.as_dimension_space_point())?;
        self.checker
            .require_dimension_space_point_to_exist(target_origin.as_dimension_space_point())?;
        let aggregate = self
            .checker
            .require_project_node_aggregate(&content_stream_id, &node_aggregate_id)?;
        self.checker.require_node_aggregate_to_not_be_root(&aggregate)?;
        self.checker.require_node_aggregate_to_not_be_tethered(&aggregate)?;
        let variant_type = self.oracle().variant_type(
            target_origin.as_dimension_space_point(),
            source_origin.as_dimension_space_point(),
        );
        if variant_type == VariantType::Same {
            return Err(CommandError::DimensionSpacePointsAreIdentical(target_origin));
        }
        self.checker
            .require_node_aggregate_to_occupy_dimension_space_point(&aggregate, &source_origin)?;
        self.checker.require_node_aggregate_to_not_occupy_dimension_space_point(
            &aggregate,
            &target_origin,
        )?;

        if let Some(parent) = self
            .graph()
            .find_parent_node_aggregates(&content_stream_id, &node_aggregate_id)
            .iter()
            .find(|parent| {
                parent.covers_dimension_space_point(source_origin.as_dimension_space_point())
            })
        {
            self.checker.require_node_aggregate_to_cover_dimension_space_point(
                parent,
                target_origin.as_dimension_space_point(),
            )?;
        }

        let visibility = self.resolver.variant_visibility(&aggregate, &target_origin)?;
        Ok(self.resolver.variant_events(
            &content_stream_id,
            &aggregate,
            variant_type,
            &source_origin,
            &target_origin,
            &visibility,
        ))
    }

    fn move_node_aggregate(
        &self,
        content_stream_id: ContentStreamId,
        node_aggregate_id: NodeAggregateId,
        point: DimensionSpacePoint,
        new_parent_node_aggregate_id: Option<NodeAggregateId>,
        new_succeeding_sibling_node_aggregate_id: Option<NodeAggregateId>,
        strategy: RelationDistributionStrategy,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        let aggregate =
            self.require_covering_aggregate(&content_stream_id, &node_aggregate_id, &point)?;
        self.checker.require_node_aggregate_to_not_be_root(&aggregate)?;
        if new_parent_node_aggregate_id.is_some() {
            self.checker.require_node_aggregate_to_not_be_tethered(&aggregate)?;
        }
        let affected = self
            .resolver
            .affected_dimension_space_points(&aggregate, &point, strategy)?;

        if let Some(new_parent_id) = &new_parent_node_aggregate_id {
            let new_parent = self
                .checker
                .require_project_node_aggregate(&content_stream_id, new_parent_id)?;
            self.checker
                .require_node_aggregate_to_cover_dimension_space_points(&new_parent, &affected)?;
            for affected_point in affected.iter() {
                self.checker.require_node_aggregate_to_not_be_descendant(
                    &content_stream_id,
                    new_parent_id,
                    &node_aggregate_id,
                    affected_point,
                )?;
            }
            self.checker.require_constraints_imposed_by_ancestors_to_be_met(
                &content_stream_id,
                &new_parent,
                aggregate.node_type_name(),
            )?;
            if let Some(node_name) = aggregate.node_name() {
                self.checker.require_node_name_to_be_uncovered(
                    &content_stream_id,
                    node_name,
                    new_parent_id,
                    Some(&node_aggregate_id),
                    &affected,
                )?;
            }
        }
        if let Some(sibling) = &new_succeeding_sibling_node_aggregate_id {
            self.checker
                .require_project_node_aggregate(&content_stream_id, sibling)?;
        }

        let succeeding_siblings = self.resolver.succeeding_siblings(
            &content_stream_id,
            Some(&node_aggregate_id),
            new_succeeding_sibling_node_aggregate_id.as_ref(),
            &point,
            &affected,
        );
        Ok(vec![NodeAggregateWasMoved {
            content_stream_id,
            node_aggregate_id,
            new_parent_node_aggregate_id,
            succeeding_siblings,
        }
        .into()])
    }

    // dimension adjustment

    fn add_dimension_shine_through(
        &self,
        content_stream_id: ContentStreamId,
        source: DimensionSpacePoint,
        target: DimensionSpacePoint,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        self.checker.require_dimension_space_point_to_exist(&source)?;
        self.checker.require_dimension_space_point_to_exist(&target)?;
        self.checker
            .require_dimension_space_point_to_be_specialization(&target, &source)?;
        self.checker
            .require_dimension_space_point_to_be_unused(&content_stream_id, &target)?;
        Ok(vec![DimensionShineThroughWasAdded {
            content_stream_id,
            source,
            target,
        }
        .into()])
    }

    fn move_dimension_space_point(
        &self,
        content_stream_id: ContentStreamId,
        source: DimensionSpacePoint,
        target: DimensionSpacePoint,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        self.checker.require_content_stream_to_exist(&content_stream_id)?;
        self.checker.require_dimension_space_point_to_exist(&target)?;
        self.checker
            .require_dimension_space_point_to_be_unused(&content_stream_id, &target)?;
        Ok(vec![DimensionSpacePointWasMoved {
            content_stream_id,
            source,
            target,
        }
        .into()])
    }
}

#[async_trait]
impl ContentGraphCommandHandler for NodeAggregateCommandHandler {
    async fn handle(&self, command: ContentGraphCommand) -> CommandResult<Vec<ContentGraphEvent>> {
        match command {
            ContentGraphCommand::CreateContentStream { content_stream_id } => {
                self.create_content_stream(content_stream_id)
            }
            ContentGraphCommand::ForkContentStream {
                new_content_stream_id,
                source_content_stream_id,
            } => self.fork_content_stream(new_content_stream_id, source_content_stream_id),
            ContentGraphCommand::RemoveContentStream { content_stream_id } => {
                self.remove_content_stream(content_stream_id)
            }
            ContentGraphCommand::CreateRootNodeAggregateWithNode {
                content_stream_id,
                node_aggregate_id,
                node_type_name,
            } => self.create_root_node_aggregate(
                content_stream_id,
                node_aggregate_id,
                node_type_name,
            ),
            ContentGraphCommand::CreateNodeAggregateWithNode {
                content_stream_id,
                node_aggregate_id,
                node_type_name,
                origin_dimension_space_point,
                parent_node_aggregate_id,
                succeeding_sibling_node_aggregate_id,
                node_name,
                initial_property_values,
                tethered_descendant_node_aggregate_ids,
            } => self.create_node_aggregate(
                content_stream_id,
                node_aggregate_id,
                node_type_name,
                origin_dimension_space_point,
                parent_node_aggregate_id,
                succeeding_sibling_node_aggregate_id,
                node_name,
                initial_property_values,
                tethered_descendant_node_aggregate_ids,
            ),
            ContentGraphCommand::ChangeNodeAggregateName {
                content_stream_id,
                node_aggregate_id,
                new_node_name,
            } => {
                self.change_node_aggregate_name(content_stream_id, node_aggregate_id, new_node_name)
            }
            ContentGraphCommand::SetNodeProperties {
                content_stream_id,
                node_aggregate_id,
                origin_dimension_space_point,
                property_values,
                properties_to_unset,
            } => self.set_node_properties(
                content_stream_id,
                node_aggregate_id,
                origin_dimension_space_point,
                property_values,
                properties_to_unset,
            ),
            ContentGraphCommand::SetNodeReferences {
                content_stream_id,
                source_node_aggregate_id,
                source_origin_dimension_space_point,
                reference_name,
                references,
            } => self.set_node_references(
                content_stream_id,
                source_node_aggregate_id,
                source_origin_dimension_space_point,
                reference_name,
                references,
            ),
            ContentGraphCommand::DisableNodeAggregate {
                content_stream_id,
                node_aggregate_id,
                covered_dimension_space_point,
                strategy,
            } => self.disable_node_aggregate(
                content_stream_id,
                node_aggregate_id,
                covered_dimension_space_point,
                strategy,
            ),
            ContentGraphCommand::EnableNodeAggregate {
                content_stream_id,
                node_aggregate_id,
                covered_dimension_space_point,
                strategy,
            } => self.enable_node_aggregate(
                content_stream_id,
                node_aggregate_id,
                covered_dimension_space_point,
                strategy,
            ),
            ContentGraphCommand::RemoveNodeAggregate {
                content_stream_id,
                node_aggregate_id,
                covered_dimension_space_point,
                strategy,
            } => self.remove_node_aggregate(
                content_stream_id,
                node_aggregate_id,
                covered_dimension_space_point,
                strategy,
            ),
            ContentGraphCommand::CreateNodeVariant {
                content_stream_id,
                node_aggregate_id,
                source_origin,
                target_origin,
            } => self.create_node_variant(
                content_stream_id,
                node_aggregate_id,
                source_origin,
                target_origin,
            ),
            ContentGraphCommand::MoveNodeAggregate {
                content_stream_id,
                node_aggregate_id,
                dimension_space_point,
                new_parent_node_aggregate_id,
                new_succeeding_sibling_node_aggregate_id,
                strategy,
            } => self.move_node_aggregate(
                content_stream_id,
                node_aggregate_id,
                dimension_space_point,
                new_parent_node_aggregate_id,
                new_succeeding_sibling_node_aggregate_id,
                strategy,
            ),
            ContentGraphCommand::ChangeNodeAggregateType {
                content_stream_id,
                node_aggregate_id,
                new_node_type_name,
            } => self.change_node_aggregate_type(
                content_stream_id,
                node_aggregate_id,
                new_node_type_name,
            ),
            ContentGraphCommand::AddDimensionShineThrough {
                content_stream_id,
                source,
                target,
            } => self.add_dimension_shine_through(content_stream_id, source, target),
            ContentGraphCommand::MoveDimensionSpacePoint {
                content_stream_id,
                source,
                target,
            } => self.move_dimension_space_point(content_stream_id, source, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{ContentDimensionConfig, InterDimensionalVariationGraph};
    use crate::infrastructure::{ContentGraphStore, EventLog, InMemoryEventLog};
    use crate::node_types::{InMemoryNodeTypeSchema, NodeTypeDefinitions};
    use crate::projections::{ContentGraphProjection, ProjectionConfig};
    use crate::queries::VisibilityConstraints;
    use serde_json::json;

    struct Fixture {
        handler: NodeAggregateCommandHandler,
        log: InMemoryEventLog,
        projection: ContentGraphProjection,
        graph: ContentGraph,
    }

    impl Fixture {
        fn new() -> Self {
            let dimensions = ContentDimensionConfig::from_json(
                r#"{
                    "dimensions": {
                        "language": {
                            "values": { "en": { "specializations": { "en_US": {} } }, "de": {} }
                        }
                    }
                }"#,
            )
            .unwrap();
            let oracle = Arc::new(InterDimensionalVariationGraph::new(&dimensions).unwrap());
            let definitions = NodeTypeDefinitions::from_json(
                &json!({
                    "Acme:Root": { "root": true },
                    "Acme:Text": {
                        "allowed_child_node_types": [],
                        "properties": { "text": { "default_value": "" } }
                    },
                    "Acme:Collection": { "allowed_child_node_types": ["Acme:Text"] },
                    "Acme:Document": {
                        "tethered_child_nodes": { "main": { "node_type": "Acme:Collection" } },
                        "properties": { "title": { "default_value": "Untitled" } }
                    }
                })
                .to_string(),
            )
            .unwrap();
            let store = ContentGraphStore::new();
            let graph = ContentGraph::new(store.clone());
            let projection =
                ContentGraphProjection::new(store, ProjectionConfig::default()).unwrap();
            let handler = NodeAggregateCommandHandler::new(
                graph.clone(),
                Arc::new(InMemoryNodeTypeSchema::new(definitions)),
                oracle,
            );
            Self {
                handler,
                log: InMemoryEventLog::new(),
                projection,
                graph,
            }
        }

        async fn execute(
            &self,
            command: ContentGraphCommand,
        ) -> CommandResult<Vec<ContentGraphEvent>> {
            let events = self.handler.handle(command).await?;
            self.log.append(events.clone()).await.unwrap();
            self.projection.catch_up(&self.log).await.unwrap();
            Ok(events)
        }

        async fn with_root(&self) {
            self.execute(ContentGraphCommand::CreateContentStream {
                content_stream_id: cs(),
            })
            .await
            .unwrap();
            self.execute(ContentGraphCommand::CreateRootNodeAggregateWithNode {
                content_stream_id: cs(),
                node_aggregate_id: NodeAggregateId::from("lady-eleonode-rootford"),
                node_type_name: NodeTypeName::from("Acme:Root"),
            })
            .await
            .unwrap();
        }
    }

    fn cs() -> ContentStreamId {
        ContentStreamId::from("cs-identifier")
    }

    fn lang(value: &str) -> OriginDimensionSpacePoint {
        OriginDimensionSpacePoint::new([("language", value)])
    }

    fn create_document(id: &str, origin: &str) -> ContentGraphCommand {
        ContentGraphCommand::CreateNodeAggregateWithNode {
            content_stream_id: cs(),
            node_aggregate_id: NodeAggregateId::from(id),
            node_type_name: NodeTypeName::from("Acme:Document"),
            origin_dimension_space_point: lang(origin),
            parent_node_aggregate_id: NodeAggregateId::from("lady-eleonode-rootford"),
            succeeding_sibling_node_aggregate_id: None,
            node_name: None,
            initial_property_values: SerializedPropertyValues::new(),
            tethered_descendant_node_aggregate_ids: BTreeMap::from([(
                "main".to_string(),
                NodeAggregateId::from(format!("{id}-main")),
            )]),
        }
    }

    #[tokio::test]
    async fn test_root_covers_whole_dimension_space() {
        let fixture = Fixture::new();
        fixture.with_root().await;

        let root = fixture
            .graph
            .find_node_aggregate_by_id(&cs(), &NodeAggregateId::from("lady-eleonode-rootford"))
            .unwrap();
        assert!(root.is_root());
        assert_eq!(root.covered_dimension_space_points().len(), 3);
    }

    #[tokio::test]
    async fn test_create_with_tethered_children_and_defaults() {
        let fixture = Fixture::new();
        fixture.with_root().await;

        let events = fixture.execute(create_document("nody", "en")).await.unwrap();
        assert_eq!(events.len(), 2);

        let subgraph = fixture.graph.subgraph(
            &cs(),
            &lang("en_US").to_dimension_space_point(),
            VisibilityConstraints::Frontend,
        );
        let node = subgraph.find_node_by_id(&NodeAggregateId::from("nody")).unwrap();
        assert_eq!(node.properties.get("title"), Some(&json!("Untitled")));
        assert!(node.is_fallback());

        let main = subgraph
            .find_child_node_by_name(&NodeAggregateId::from("nody"), &NodeName::from("main"))
            .unwrap();
        assert_eq!(main.node_aggregate_id, NodeAggregateId::from("nody-main"));
        assert_eq!(main.classification, NodeAggregateClassification::Tethered);
    }

    #[tokio::test]
    async fn test_rejects_disallowed_child_type() {
        let fixture = Fixture::new();
        fixture.with_root().await;
        fixture.execute(create_document("nody", "en")).await.unwrap();

        let error = fixture
            .execute(ContentGraphCommand::CreateNodeAggregateWithNode {
                content_stream_id: cs(),
                node_aggregate_id: NodeAggregateId::from("doc-in-main"),
                node_type_name: NodeTypeName::from("Acme:Document"),
                origin_dimension_space_point: lang("en"),
                parent_node_aggregate_id: NodeAggregateId::from("nody-main"),
                succeeding_sibling_node_aggregate_id: None,
                node_name: None,
                initial_property_values: SerializedPropertyValues::new(),
                tethered_descendant_node_aggregate_ids: BTreeMap::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            error,
            CommandError::NodeConstraintViolation {
                parent: NodeTypeName::from("Acme:Collection"),
                child: NodeTypeName::from("Acme:Document"),
            }
        );
    }

    #[tokio::test]
    async fn test_specialization_variant_includes_tethered_children() {
        let fixture = Fixture::new();
        fixture.with_root().await;
        fixture.execute(create_document("nody", "en")).await.unwrap();

        let events = fixture
            .execute(ContentGraphCommand::CreateNodeVariant {
                content_stream_id: cs(),
                node_aggregate_id: NodeAggregateId::from("nody"),
                source_origin: lang("en"),
                target_origin: lang("en_US"),
            })
            .await
            .unwrap();
        assert_eq!(events.len(), 2);

        let main = fixture
            .graph
            .find_node_aggregate_by_id(&cs(), &NodeAggregateId::from("nody-main"))
            .unwrap();
        assert!(main.occupies_dimension_space_point(&lang("en_US")));
        assert_eq!(main.occupied_dimension_space_points().len(), 2);
    }

    #[tokio::test]
    async fn test_identical_variant_origins_are_rejected() {
        let fixture = Fixture::new();
        fixture.with_root().await;
        fixture.execute(create_document("nody", "en")).await.unwrap();

        let error = fixture
            .execute(ContentGraphCommand::CreateNodeVariant {
                content_stream_id: cs(),
                node_aggregate_id: NodeAggregateId::from("nody"),
                source_origin: lang("en"),
                target_origin: lang("en"),
            })
            .await
            .unwrap_err();
        assert_eq!(error, CommandError::DimensionSpacePointsAreIdentical(lang("en")));
    }

    #[tokio::test]
    async fn test_disable_twice_is_a_conflict() {
        let fixture = Fixture::new();
        fixture.with_root().await;
        fixture.execute(create_document("nody", "en")).await.unwrap();

        let disable = ContentGraphCommand::DisableNodeAggregate {
            content_stream_id: cs(),
            node_aggregate_id: NodeAggregateId::from("nody"),
            covered_dimension_space_point: lang("en").to_dimension_space_point(),
            strategy: RelationDistributionStrategy::GatherSpecializations,
        };
        let events = fixture.execute(disable.clone()).await.unwrap();
        match &events[0] {
            ContentGraphEvent::NodeAggregateWasDisabled(event) => {
                assert_eq!(event.affected_dimension_space_points.len(), 2);
            }
            other => panic!("Expected NodeAggregateWasDisabled, got {other:?}"),
        }

        let error = fixture.execute(disable).await.unwrap_err();
        assert!(matches!(
            error,
            CommandError::NodeAggregateCurrentlyDisablesDimensionSpacePoint { .. }
        ));
    }

    #[tokio::test]
    async fn test_tethered_nodes_cannot_be_removed() {
        let fixture = Fixture::new();
        fixture.with_root().await;
        fixture.execute(create_document("nody", "en")).await.unwrap();

        let error = fixture
            .execute(ContentGraphCommand::RemoveNodeAggregate {
                content_stream_id: cs(),
                node_aggregate_id: NodeAggregateId::from("nody-main"),
                covered_dimension_space_point: lang("en").to_dimension_space_point(),
                strategy: RelationDistributionStrategy::GatherAll,
            })
            .await
            .unwrap_err();
        assert_eq!(
            error,
            CommandError::NodeAggregateIsTethered(NodeAggregateId::from("nody-main"))
        );
    }
}
