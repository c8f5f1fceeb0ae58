//! Interdimensional variation
//!
//! The variation oracle classifies dimension space points relative to each other. The
//! concrete [`InterDimensionalVariationGraph`] derives the relation from the configured
//! per-dimension value trees: a point S specializes G iff S != G and every coordinate
//! of S equals or specializes the corresponding coordinate of G.

use super::{
    ContentDimensionConfig, ContentDimensionValue, DimensionSpaceError, DimensionSpacePoint,
    DimensionSpacePointSet,
};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Relation of a subject point to a reference point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantType {
    /// The subject specializes the reference
    Specialization,
    /// The subject generalizes the reference
    Generalization,
    /// Neither specialization nor generalization
    Peer,
    /// Subject and reference are the same point
    Same,
}

/// Capability classifying dimension space points
pub trait VariationOracle: Send + Sync {
    /// All points of the configured dimension space
    fn allowed_dimension_subspace(&self) -> &DimensionSpacePointSet;

    /// All points specializing the given point, excluding the point itself
    fn indexed_specializations(&self, generalization: &DimensionSpacePoint)
        -> DimensionSpacePointSet;

    /// All points generalizing the given point, excluding the point itself
    fn indexed_generalizations(&self, specialization: &DimensionSpacePoint)
        -> DimensionSpacePointSet;

    /// Classify `subject` relative to `reference`
    fn variant_type(
        &self,
        subject: &DimensionSpacePoint,
        reference: &DimensionSpacePoint,
    ) -> VariantType {
        if subject == reference {
            VariantType::Same
        } else if self.indexed_generalizations(reference).contains(subject) {
            VariantType::Generalization
        } else if self.indexed_specializations(reference).contains(subject) {
            VariantType::Specialization
        } else {
            VariantType::Peer
        }
    }

    /// The origin (optionally) together with its specializations that are not excluded
    fn specialization_set(
        &self,
        origin: &DimensionSpacePoint,
        include_origin: bool,
        excluded: Option<&DimensionSpacePointSet>,
    ) -> Result<DimensionSpacePointSet, DimensionSpaceError> {
        if !self.allowed_dimension_subspace().contains(origin) {
            return Err(DimensionSpaceError::PointNotFound(origin.to_json()));
        }
        let mut set = DimensionSpacePointSet::empty();
        if include_origin {
            set.insert(origin.clone());
        }
        for specialization in self.indexed_specializations(origin) {
            if excluded.map_or(true, |excluded| !excluded.contains(&specialization)) {
                set.insert(specialization);
            }
        }
        Ok(set)
    }

    /// Points without any generalization
    fn root_generalizations(&self) -> DimensionSpacePointSet {
        self.allowed_dimension_subspace()
            .iter()
            .filter(|p| self.indexed_generalizations(p).is_empty())
            .cloned()
            .collect()
    }
}

/// Per dimension value graph, edges lead from a value to its direct specializations
struct DimensionValueGraph {
    graph: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
    ordered_values: Vec<String>,
}

impl DimensionValueGraph {
    fn build(values: &indexmap::IndexMap<String, ContentDimensionValue>) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        let mut ordered_values = Vec::new();
        let mut stack: Vec<(Option<NodeIndex>, &String, &ContentDimensionValue)> =
            values.iter().rev().map(|(v, n)| (None, v, n)).collect();
        while let Some((parent, value, node)) = stack.pop() {
            let index = graph.add_node(value.clone());
            indices.insert(value.clone(), index);
            ordered_values.push(value.clone());
            if let Some(parent) = parent {
                graph.add_edge(parent, index, ());
            }
            stack.extend(
                node.specializations
                    .iter()
                    .rev()
                    .map(|(v, n)| (Some(index), v, n)),
            );
        }
        Self {
            graph,
            indices,
            ordered_values,
        }
    }

    /// Strict specializations of every value
    fn specializations(&self) -> HashMap<String, HashSet<String>> {
        let mut result = HashMap::new();
        for (value, index) in &self.indices {
            let mut reachable = HashSet::new();
            let mut dfs = Dfs::new(&self.graph, *index);
            while let Some(next) = dfs.next(&self.graph) {
                if next != *index {
                    reachable.insert(self.graph[next].clone());
                }
            }
            result.insert(value.clone(), reachable);
        }
        result
    }
}

/// Variation oracle derived from the content dimension configuration
pub struct InterDimensionalVariationGraph {
    subspace: DimensionSpacePointSet,
    specializations: HashMap<String, DimensionSpacePointSet>,
    generalizations: HashMap<String, DimensionSpacePointSet>,
}

impl InterDimensionalVariationGraph {
    /// Build the variation graph for a configuration
    pub fn new(config: &ContentDimensionConfig) -> Result<Self, DimensionSpaceError> {
        config.validate()?;

        let mut value_graphs = Vec::new();
        for (name, dimension) in &config.dimensions {
            let graph = DimensionValueGraph::build(&dimension.values);
            let specializations = graph.specializations();
            value_graphs.push((name.clone(), graph.ordered_values, specializations));
        }

        // cartesian product over all dimensions, in configuration order
        let mut combinations: Vec<Vec<(String, String)>> = vec![Vec::new()];
        for (name, values, _) in &value_graphs {
            combinations = combinations
                .into_iter()
                .flat_map(|prefix| {
                    values.iter().map(move |value| {
                        let mut combination = prefix.clone();
                        combination.push((name.clone(), value.clone()));
                        combination
                    })
                })
                .collect();
        }
        let subspace: DimensionSpacePointSet = combinations
            .into_iter()
            .map(DimensionSpacePoint::new)
            .collect();

        let specializes = |specialization: &DimensionSpacePoint,
                           generalization: &DimensionSpacePoint|
         -> bool {
            specialization != generalization
                && value_graphs.iter().all(|(name, _, value_specializations)| {
                    match (
                        specialization.coordinate(name),
                        generalization.coordinate(name),
                    ) {
                        (Some(s), Some(g)) => {
                            s == g
                                || value_specializations
                                    .get(g)
                                    .map_or(false, |set| set.contains(s))
                        }
                        _ => false,
                    }
                })
        };

        let mut specializations: HashMap<String, DimensionSpacePointSet> = HashMap::new();
        let mut generalizations: HashMap<String, DimensionSpacePointSet> = HashMap::new();
        for generalization in subspace.iter() {
            for specialization in subspace.iter() {
                if specializes(specialization, generalization) {
                    specializations
                        .entry(generalization.hash().to_string())
                        .or_default()
                        .insert(specialization.clone());
                    generalizations
                        .entry(specialization.hash().to_string())
                        .or_default()
                        .insert(generalization.clone());
                }
            }
        }

        tracing::debug!(
            points = subspace.len(),
            dimensions = value_graphs.len(),
            "built interdimensional variation graph"
        );

        Ok(Self {
            subspace,
            specializations,
            generalizations,
        })
    }
}

impl VariationOracle for InterDimensionalVariationGraph {
    fn allowed_dimension_subspace(&self) -> &DimensionSpacePointSet {
        &self.subspace
    }

    fn indexed_specializations(
        &self,
        generalization: &DimensionSpacePoint,
    ) -> DimensionSpacePointSet {
        self.specializations
            .get(generalization.hash())
            .cloned()
            .unwrap_or_default()
    }

    fn indexed_generalizations(
        &self,
        specialization: &DimensionSpacePoint,
    ) -> DimensionSpacePointSet {
        self.generalizations
            .get(specialization.hash())
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(value: &str) -> DimensionSpacePoint {
        DimensionSpacePoint::new([("language", value)])
    }

    fn language_graph() -> InterDimensionalVariationGraph {
        let config = ContentDimensionConfig::from_json(
            r#"{
                "dimensions": {
                    "language": {
                        "values": {
                            "mul": {
                                "specializations": {
                                    "en": { "specializations": { "en_US": {} } },
                                    "de": { "specializations": { "gsw": {} } }
                                }
                            },
                            "fr": {}
                        }
                    }
                }
            }"#,
        )
        .unwrap();
        InterDimensionalVariationGraph::new(&config).unwrap()
    }

    #[test]
    fn test_allowed_subspace() {
        let graph = language_graph();
        assert_eq!(graph.allowed_dimension_subspace().len(), 6);
        assert!(graph.allowed_dimension_subspace().contains(&lang("gsw")));
    }

    #[test]
    fn test_transitive_specializations() {
        let graph = language_graph();
        let specializations = graph.indexed_specializations(&lang("mul"));
        assert_eq!(
            specializations,
            DimensionSpacePointSet::new([lang("en"), lang("en_US"), lang("de"), lang("gsw")])
        );
        assert!(graph.indexed_generalizations(&lang("en_US")).contains(&lang("mul")));
    }

    #[test]
    fn test_variant_types() {
        let graph = language_graph();
        assert_eq!(graph.variant_type(&lang("de"), &lang("mul")), VariantType::Specialization);
        assert_eq!(graph.variant_type(&lang("mul"), &lang("gsw")), VariantType::Generalization);
        assert_eq!(graph.variant_type(&lang("en"), &lang("de")), VariantType::Peer);
        assert_eq!(graph.variant_type(&lang("fr"), &lang("fr")), VariantType::Same);
    }

    #[test]
    fn test_specialization_set_with_exclusions() {
        let graph = language_graph();
        let excluded = DimensionSpacePointSet::new([lang("de"), lang("gsw")]);
        let set = graph
            .specialization_set(&lang("mul"), true, Some(&excluded))
            .unwrap();
        assert_eq!(
            set,
            DimensionSpacePointSet::new([lang("mul"), lang("en"), lang("en_US")])
        );
        assert!(graph
            .specialization_set(&lang("klingon"), true, None)
            .is_err());
    }

    #[test]
    fn test_root_generalizations() {
        let graph = language_graph();
        assert_eq!(
            graph.root_generalizations(),
            DimensionSpacePointSet::new([lang("mul"), lang("fr")])
        );
    }

    #[test]
    fn test_two_dimensional_space() {
        let config = ContentDimensionConfig::none()
            .with_flat_dimension("language", ["en", "de"])
            .with_flat_dimension("market", ["CH", "DE"]);
        let graph = InterDimensionalVariationGraph::new(&config).unwrap();
        assert_eq!(graph.allowed_dimension_subspace().len(), 4);
        assert_eq!(graph.root_generalizations().len(), 4);
    }

    #[test]
    fn test_dimensionless_space_has_the_empty_point() {
        let graph = InterDimensionalVariationGraph::new(&ContentDimensionConfig::none()).unwrap();
        assert_eq!(
            graph.allowed_dimension_subspace(),
            &DimensionSpacePointSet::single(DimensionSpacePoint::empty())
        );
    }
}
