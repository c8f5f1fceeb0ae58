//! Constraint checks over the read API
//!
//! Each check either passes or fails with exactly one named [`CommandError`]. Checks
//! never write and never log.

use crate::aggregate::NodeAggregate;
use crate::commands::{CommandError, CommandResult};
use crate::dimension::{
    DimensionSpacePoint, DimensionSpacePointSet, OriginDimensionSpacePoint, VariantType,
    VariationOracle,
};
use crate::node_types::NodeTypeSchema;
use crate::queries::{ContentGraph, VisibilityConstraints};
use crate::value_objects::{ContentStreamId, NodeAggregateId, NodeName, NodeTypeName, ReferenceName};
use std::sync::Arc;

/// Validates commands against the current content graph
#[derive(Clone)]
pub struct ConstraintChecker {
    graph: ContentGraph,
    schema: Arc<dyn NodeTypeSchema>,
    oracle: Arc<dyn VariationOracle>,
}

impl ConstraintChecker {
    /// Create a checker reading from `graph`
    pub fn new(
        graph: ContentGraph,
        schema: Arc<dyn NodeTypeSchema>,
        oracle: Arc<dyn VariationOracle>,
    ) -> Self {
        Self {
            graph,
            schema,
            oracle,
        }
    }

    pub fn graph(&self) -> &ContentGraph {
        &self.graph
    }

    pub fn schema(&self) -> &dyn NodeTypeSchema {
        self.schema.as_ref()
    }

    pub fn oracle(&self) -> &dyn VariationOracle {
        self.oracle.as_ref()
    }

    // existence

    pub fn require_content_stream_to_exist(
        &self,
        content_stream_id: &ContentStreamId,
    ) -> CommandResult<()> {
        if !self.graph.has_content_stream(content_stream_id) {
            return Err(CommandError::ContentStreamDoesNotExistYet(
                content_stream_id.clone(),
            ));
        }
        Ok(())
    }

    pub fn require_content_stream_to_not_exist(
        &self,
        content_stream_id: &ContentStreamId,
    ) -> CommandResult<()> {
        if self.graph.has_content_stream(content_stream_id) {
            return Err(CommandError::ContentStreamAlreadyExists(
                content_stream_id.clone(),
            ));
        }
        Ok(())
    }

    /// Load the aggregate or fail
    pub fn require_project_node_aggregate(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
    ) -> CommandResult<NodeAggregate> {
        self.graph
            .find_node_aggregate_by_id(content_stream_id, node_aggregate_id)
            .ok_or_else(|| CommandError::NodeAggregateCurrentlyDoesNotExist(node_aggregate_id.clone()))
    }

    pub fn require_node_aggregate_to_not_exist(
        &self,
        content_stream_id: &ContentStreamId,
        node_aggregate_id: &NodeAggregateId,
    ) -> CommandResult<()> {
        if self
            .graph
            .find_node_aggregate_by_id(content_stream_id, node_aggregate_id)
            .is_some()
        {
            return Err(CommandError::NodeAggregateCurrentlyExists(
                node_aggregate_id.clone(),
            ));
        }
        Ok(())
    }

    pub fn require_node_type(&self, node_type_name: &NodeTypeName) -> CommandResult<()> {
        if !self.schema.has_node_type(node_type_name) {
            return Err(CommandError::NodeTypeNotFound(node_type_name.clone()));
        }
        Ok(())
    }

    pub fn require_node_type_to_not_be_abstract(
        &self,
        node_type_name: &NodeTypeName,
    ) -> CommandResult<()> {
        if self.schema.is_abstract(node_type_name) {
            return Err(CommandError::NodeTypeIsAbstract(node_type_name.clone()));
        }
        Ok(())
    }

    pub fn require_node_type_to_be_of_type_root(
        &self,
        node_type_name: &NodeTypeName,
    ) -> CommandResult<()> {
        if !self.schema.is_root(node_type_name) {
            return Err(CommandError::NodeTypeIsNotOfTypeRoot(node_type_name.clone()));
        }
        Ok(())
    }

    pub fn require_node_type_to_not_be_of_type_root(
        &self,
        node_type_name: &NodeTypeName,
    ) -> CommandResult<()> {
        if self.schema.is_root(node_type_name) {
            return Err(CommandError::NodeTypeIsOfTypeRoot(node_type_name.clone()));
        }
        Ok(())
    }

    /// At most one root aggregate per type and stream
    pub fn require_root_node_type_to_be_unoccupied(
        &self,
        content_stream_id: &ContentStreamId,
        node_type_name: &NodeTypeName,
    ) -> CommandResult<()> {
        if self
            .graph
            .find_root_node_aggregate_by_type(content_stream_id, node_type_name)
            .is_some()
        {
            return Err(CommandError::RootNodeAggregateTypeIsAlreadyOccupied(
                node_type_name.clone(),
            ));
        }
        Ok(())
    }

    pub fn require_node_aggregate_to_not_be_root(&self, aggregate: &NodeAggregate) -> CommandResult<()> {
        if aggregate.is_root() {
            return Err(CommandError::NodeAggregateIsRoot(
                aggregate.node_aggregate_id().clone(),
            ));
        }
        Ok(())
    }

    pub fn require_node_aggregate_to_not_be_tethered(
        &self,
        aggregate: &NodeAggregate,
    ) -> CommandResult<()> {
        if aggregate.is_tethered() {
            return Err(CommandError::NodeAggregateIsTethered(
                aggregate.node_aggregate_id().clone(),
            ));
        }
        Ok(())
    }

    // dimension membership

    pub fn require_dimension_space_point_to_exist(
        &self,
        point: &DimensionSpacePoint,
    ) -> CommandResult<()> {
        if !self.oracle.allowed_dimension_subspace().contains(point) {
            return Err(CommandError::DimensionSpacePointNotFound(point.clone()));
        }
        Ok(())
    }

    pub fn require_dimension_space_point_to_be_specialization(
        &self,
        point: &DimensionSpacePoint,
        generalization: &DimensionSpacePoint,
    ) -> CommandResult<()> {
        if self.oracle.variant_type(point, generalization) != VariantType::Specialization {
            return Err(CommandError::DimensionSpacePointIsNoSpecialization {
                point: point.clone(),
                generalization: generalization.clone(),
            });
        }
        Ok(())
    }

    pub fn require_dimension_space_point_to_be_unused(
        &self,
        content_stream_id: &ContentStreamId,
        point: &DimensionSpacePoint,
    ) -> CommandResult<()> {
        if self
            .graph
            .dimension_space_points_in_use(content_stream_id)
            .contains(point)
        {
            return Err(CommandError::DimensionSpacePointIsAlreadyInUse(point.clone()));
        }
        Ok(())
    }

    pub fn require_node_aggregate_to_occupy_dimension_space_point(
        &self,
        aggregate: &NodeAggregate,
        origin: &OriginDimensionSpacePoint,
    ) -> CommandResult<()> {
        if !aggregate.occupies_dimension_space_point(origin) {
            return Err(CommandError::DimensionSpacePointIsNotYetOccupied {
                node_aggregate_id: aggregate.node_aggregate_id().clone(),
                origin: origin.clone(),
            });
        }
        Ok(())
    }

    pub fn require_node_aggregate_to_not_occupy_dimension_space_point(
        &self,
        aggregate: &NodeAggregate,
        origin: &OriginDimensionSpacePoint,
    ) -> CommandResult<()> {
        if aggregate.occupies_dimension_space_point(origin) {
            return Err(CommandError::DimensionSpacePointIsAlreadyOccupied {
                node_aggregate_id: aggregate.node_aggregate_id().clone(),
                origin: origin.clone(),
            });
        }
        Ok(())
    }

    pub fn require_node_aggregate_to_cover_dimension_space_point(
        &self,
        aggregate: &NodeAggregate,
        point: &DimensionSpacePoint,
    ) -> CommandResult<()> {
        if !aggregate.covers_dimension_space_point(point) {
            return Err(CommandError::NodeAggregateDoesCurrentlyNotCoverDimensionSpacePoint {
                node_aggregate_id: aggregate.node_aggregate_id().clone(),
                dimension_space_point: point.clone(),
            });
        }
        Ok(())
    }

    /// Fails on the first point of `points` the aggregate does not cover
    pub fn require_node_aggregate_to_cover_dimension_space_points(
        &self,
        aggregate: &NodeAggregate,
        points: &DimensionSpacePointSet,
    ) -> CommandResult<()> {
        points
            .iter()
            .try_for_each(|point| self.require_node_aggregate_to_cover_dimension_space_point(aggregate, point))
    }

    pub fn require_node_aggregate_to_disable_dimension_space_point(
        &self,
        aggregate: &NodeAggregate,
        point: &DimensionSpacePoint,
    ) -> CommandResult<()> {
        if !aggregate.disables_dimension_space_point(point) {
            return Err(
                CommandError::NodeAggregateDoesCurrentlyNotDisableDimensionSpacePoint {
                    node_aggregate_id: aggregate.node_aggregate_id().clone(),
                    dimension_space_point: point.clone(),
                },
            );
        }
        Ok(())
    }

    pub fn require_node_aggregate_to_not_disable_dimension_space_point(
        &self,
        aggregate: &NodeAggregate,
        point: &DimensionSpacePoint,
    ) -> CommandResult<()> {
        if aggregate.disables_dimension_space_point(point) {
            return Err(CommandError::NodeAggregateCurrentlyDisablesDimensionSpacePoint {
                node_aggregate_id: aggregate.node_aggregate_id().clone(),
                dimension_space_point: point.clone(),
            });
        }
        Ok(())
    }

    // structural typing

    /// `child_type` must be allowed below `parent`, and below `parent`'s grandparent
    /// when `parent` is a tethered node
    pub fn require_constraints_imposed_by_ancestors_to_be_met(
        &self,
        content_stream_id: &ContentStreamId,
        parent: &NodeAggregate,
        child_type: &NodeTypeName,
    ) -> CommandResult<()> {
        if !self
            .schema
            .allows_child_node_type(parent.node_type_name(), child_type)
        {
            return Err(CommandError::NodeConstraintViolation {
                parent: parent.node_type_name().clone(),
                child: child_type.clone(),
            });
        }

        let Some(tethered_name) = parent.node_name().filter(|_| parent.is_tethered()) else {
            return Ok(());
        };
        for grandparent in self
            .graph
            .find_parent_node_aggregates(content_stream_id, parent.node_aggregate_id())
        {
            if !self.schema.allows_grandchild_node_type(
                grandparent.node_type_name(),
                tethered_name,
                child_type,
            ) {
                return Err(CommandError::GrandchildConstraintViolation {
                    grandparent: grandparent.node_type_name().clone(),
                    tethered_name: tethered_name.clone(),
                    grandchild: child_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// The existing regular children of an aggregate must be allowed below `node_type`
    pub fn require_existing_children_to_be_allowed(
        &self,
        content_stream_id: &ContentStreamId,
        aggregate: &NodeAggregate,
        node_type: &NodeTypeName,
    ) -> CommandResult<()> {
        for child in self
            .graph
            .find_child_node_aggregates(content_stream_id, aggregate.node_aggregate_id())
            .iter()
            .filter(|child| !child.is_tethered())
        {
            if !self
                .schema
                .allows_child_node_type(node_type, child.node_type_name())
            {
                return Err(CommandError::NodeConstraintViolation {
                    parent: node_type.clone(),
                    child: child.node_type_name().clone(),
                });
            }
        }
        Ok(())
    }

    /// `candidate` must be neither `aggregate` itself nor one of its descendants in `point`
    pub fn require_node_aggregate_to_not_be_descendant(
        &self,
        content_stream_id: &ContentStreamId,
        candidate: &NodeAggregateId,
        aggregate: &NodeAggregateId,
        point: &DimensionSpacePoint,
    ) -> CommandResult<()> {
        let is_descendant = candidate == aggregate
            || self
                .graph
                .subgraph(content_stream_id, point, VisibilityConstraints::WithoutRestrictions)
                .find_descendant_nodes(aggregate)
                .iter()
                .any(|node| &node.node_aggregate_id == candidate);
        if is_descendant {
            return Err(CommandError::NodeAggregateIsDescendant {
                node_aggregate_id: candidate.clone(),
                ancestor: aggregate.clone(),
            });
        }
        Ok(())
    }

    pub fn require_property_to_be_declared(
        &self,
        node_type_name: &NodeTypeName,
        property_name: &str,
    ) -> CommandResult<()> {
        if !self.schema.has_property(node_type_name, property_name) {
            return Err(CommandError::PropertyCannotBeSet {
                property_name: property_name.to_string(),
                node_type_name: node_type_name.clone(),
            });
        }
        Ok(())
    }

    pub fn require_reference_to_be_declared(
        &self,
        node_type_name: &NodeTypeName,
        reference_name: &ReferenceName,
    ) -> CommandResult<()> {
        if !self.schema.has_reference(node_type_name, reference_name) {
            return Err(CommandError::ReferenceCannotBeSet {
                reference_name: reference_name.clone(),
                node_type_name: node_type_name.clone(),
            });
        }
        Ok(())
    }

    // naming

    /// No child of the parent's row at `parent_origin` may carry `node_name` in `points`
    pub fn require_node_name_to_be_unoccupied(
        &self,
        content_stream_id: &ContentStreamId,
        node_name: &NodeName,
        parent_node_aggregate_id: &NodeAggregateId,
        parent_origin: &OriginDimensionSpacePoint,
        points: &DimensionSpacePointSet,
    ) -> CommandResult<()> {
        let occupied = self.graph.dimension_space_points_occupied_by_child_node_name(
            content_stream_id,
            node_name,
            parent_node_aggregate_id,
            parent_origin,
            points,
        );
        if !occupied.is_empty() {
            return Err(CommandError::NodeNameIsAlreadyOccupied {
                node_name: node_name.clone(),
                parent_node_aggregate_id: parent_node_aggregate_id.clone(),
            });
        }
        Ok(())
    }

    /// No other child of the parent carrying `node_name` may cover any of `points`
    pub fn require_node_name_to_be_uncovered(
        &self,
        content_stream_id: &ContentStreamId,
        node_name: &NodeName,
        parent_node_aggregate_id: &NodeAggregateId,
        except: Option<&NodeAggregateId>,
        points: &DimensionSpacePointSet,
    ) -> CommandResult<()> {
        let covered = self
            .graph
            .find_child_node_aggregates_by_name(content_stream_id, parent_node_aggregate_id, node_name)
            .into_iter()
            .filter(|child| Some(child.node_aggregate_id()) != except)
            .any(|child| points.iter().any(|p| child.covers_dimension_space_point(p)));
        if covered {
            return Err(CommandError::NodeNameIsAlreadyCovered {
                node_name: node_name.clone(),
                parent_node_aggregate_id: parent_node_aggregate_id.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{ContentDimensionConfig, InterDimensionalVariationGraph};
    use crate::infrastructure::ContentGraphStore;
    use crate::node_types::{InMemoryNodeTypeSchema, NodeTypeDefinition, NodeTypeDefinitions};

    fn checker() -> ConstraintChecker {
        let config = ContentDimensionConfig::none().with_flat_dimension("language", ["en", "de"]);
        let oracle = InterDimensionalVariationGraph::new(&config).unwrap();
        let definitions = NodeTypeDefinitions::new()
            .with(
                "Acme:Root",
                NodeTypeDefinition {
                    is_root: true,
                    ..Default::default()
                },
            )
            .with(
                "Acme:Content",
                NodeTypeDefinition {
                    is_abstract: true,
                    ..Default::default()
                },
            );
        ConstraintChecker::new(
            ContentGraph::new(ContentGraphStore::new()),
            Arc::new(InMemoryNodeTypeSchema::new(definitions)),
            Arc::new(oracle),
        )
    }

    #[test]
    fn test_missing_content_stream() {
        let checker = checker();
        let error = checker
            .require_content_stream_to_exist(&ContentStreamId::from("cs"))
            .unwrap_err();
        assert_eq!(
            error,
            CommandError::ContentStreamDoesNotExistYet(ContentStreamId::from("cs"))
        );
        assert!(checker
            .require_content_stream_to_not_exist(&ContentStreamId::from("cs"))
            .is_ok());
    }

    #[test]
    fn test_node_type_checks() {
        let checker = checker();
        assert_eq!(
            checker.require_node_type(&NodeTypeName::from("Acme:Missing")),
            Err(CommandError::NodeTypeNotFound(NodeTypeName::from("Acme:Missing")))
        );
        assert!(checker
            .require_node_type_to_not_be_abstract(&NodeTypeName::from("Acme:Content"))
            .is_err());
        assert!(checker
            .require_node_type_to_be_of_type_root(&NodeTypeName::from("Acme:Root"))
            .is_ok());
        assert_eq!(
            checker.require_node_type_to_not_be_of_type_root(&NodeTypeName::from("Acme:Root")),
            Err(CommandError::NodeTypeIsOfTypeRoot(NodeTypeName::from("Acme:Root")))
        );
    }

    #[test]
    fn test_dimension_membership() {
        let checker = checker();
        let en = DimensionSpacePoint::new([("language", "en")]);
        let fr = DimensionSpacePoint::new([("language", "fr")]);
        assert!(checker.require_dimension_space_point_to_exist(&en).is_ok());
        assert_eq!(
            checker.require_dimension_space_point_to_exist(&fr),
            Err(CommandError::DimensionSpacePointNotFound(fr))
        );
        let de = DimensionSpacePoint::new([("language", "de")]);
        assert!(matches!(
            checker.require_dimension_space_point_to_be_specialization(&de, &en),
            Err(CommandError::DimensionSpacePointIsNoSpecialization { .. })
        ));
    }
}
