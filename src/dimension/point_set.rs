//! Dimension space point sets
//!
//! Insertion ordered sets keyed by point hash. Equality is set equality.

use super::{DimensionSpacePoint, OriginDimensionSpacePoint};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A set of dimension space points
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<DimensionSpacePoint>", into = "Vec<DimensionSpacePoint>")]
pub struct DimensionSpacePointSet {
    points: IndexMap<String, DimensionSpacePoint>,
}

impl DimensionSpacePointSet {
    /// Create a set from points
    pub fn new(points: impl IntoIterator<Item = DimensionSpacePoint>) -> Self {
        points.into_iter().collect()
    }

    /// The empty set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set containing exactly one point
    pub fn single(point: DimensionSpacePoint) -> Self {
        Self::new([point])
    }

    /// Whether the set contains the point
    pub fn contains(&self, point: &DimensionSpacePoint) -> bool {
        self.points.contains_key(point.hash())
    }

    /// Whether the set contains a point with the given hash
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.points.contains_key(hash)
    }

    /// Look up a point by hash
    pub fn get_by_hash(&self, hash: &str) -> Option<&DimensionSpacePoint> {
        self.points.get(hash)
    }

    /// Insert a point, returning whether it was new
    pub fn insert(&mut self, point: DimensionSpacePoint) -> bool {
        self.points.insert(point.hash().to_string(), point).is_none()
    }

    /// Remove a point, returning whether it was present
    pub fn remove(&mut self, point: &DimensionSpacePoint) -> bool {
        self.points.shift_remove(point.hash()).is_some()
    }

    /// Points in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &DimensionSpacePoint> {
        self.points.values()
    }

    /// Hash keys of all points, in insertion order
    pub fn point_hashes(&self) -> Vec<String> {
        self.points.keys().cloned().collect()
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points of both sets
    pub fn union(&self, other: &DimensionSpacePointSet) -> Self {
        let mut union = self.clone();
        for point in other.iter() {
            union.insert(point.clone());
        }
        union
    }

    /// Points contained in both sets
    pub fn intersection(&self, other: &DimensionSpacePointSet) -> Self {
        self.iter().filter(|p| other.contains(p)).cloned().collect()
    }

    /// Points of this set not contained in the other
    pub fn difference(&self, other: &DimensionSpacePointSet) -> Self {
        self.iter().filter(|p| !other.contains(p)).cloned().collect()
    }

    /// Whether every point of this set is contained in the other
    pub fn is_subset_of(&self, other: &DimensionSpacePointSet) -> bool {
        self.iter().all(|p| other.contains(p))
    }
}

impl PartialEq for DimensionSpacePointSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset_of(other)
    }
}

impl Eq for DimensionSpacePointSet {}

impl FromIterator<DimensionSpacePoint> for DimensionSpacePointSet {
    fn from_iter<T: IntoIterator<Item = DimensionSpacePoint>>(iter: T) -> Self {
        let mut set = Self::default();
        for point in iter {
            set.insert(point);
        }
        set
    }
}

impl From<Vec<DimensionSpacePoint>> for DimensionSpacePointSet {
    fn from(points: Vec<DimensionSpacePoint>) -> Self {
        points.into_iter().collect()
    }
}

impl From<DimensionSpacePointSet> for Vec<DimensionSpacePoint> {
    fn from(set: DimensionSpacePointSet) -> Self {
        set.points.into_values().collect()
    }
}

impl IntoIterator for DimensionSpacePointSet {
    type Item = DimensionSpacePoint;
    type IntoIter = indexmap::map::IntoValues<String, DimensionSpacePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_values()
    }
}

impl<'a> IntoIterator for &'a DimensionSpacePointSet {
    type Item = &'a DimensionSpacePoint;
    type IntoIter = indexmap::map::Values<'a, String, DimensionSpacePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.values()
    }
}

impl fmt::Debug for DimensionSpacePointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A set of origin dimension space points
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<OriginDimensionSpacePoint>", into = "Vec<OriginDimensionSpacePoint>")]
pub struct OriginDimensionSpacePointSet {
    points: IndexMap<String, OriginDimensionSpacePoint>,
}

impl OriginDimensionSpacePointSet {
    /// Create a set from origins
    pub fn new(points: impl IntoIterator<Item = OriginDimensionSpacePoint>) -> Self {
        points.into_iter().collect()
    }

    /// Whether the set contains the origin
    pub fn contains(&self, origin: &OriginDimensionSpacePoint) -> bool {
        self.points.contains_key(origin.hash())
    }

    /// Insert an origin, returning whether it was new
    pub fn insert(&mut self, origin: OriginDimensionSpacePoint) -> bool {
        self.points.insert(origin.hash().to_string(), origin).is_none()
    }

    /// Origins in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &OriginDimensionSpacePoint> {
        self.points.values()
    }

    /// Number of origins
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The origins as plain points
    pub fn to_dimension_space_point_set(&self) -> DimensionSpacePointSet {
        self.iter()
            .map(OriginDimensionSpacePoint::to_dimension_space_point)
            .collect()
    }
}

impl FromIterator<OriginDimensionSpacePoint> for OriginDimensionSpacePointSet {
    fn from_iter<T: IntoIterator<Item = OriginDimensionSpacePoint>>(iter: T) -> Self {
        let mut set = Self::default();
        for origin in iter {
            set.insert(origin);
        }
        set
    }
}

impl From<Vec<OriginDimensionSpacePoint>> for OriginDimensionSpacePointSet {
    fn from(points: Vec<OriginDimensionSpacePoint>) -> Self {
        points.into_iter().collect()
    }
}

impl From<OriginDimensionSpacePointSet> for Vec<OriginDimensionSpacePoint> {
    fn from(set: OriginDimensionSpacePointSet) -> Self {
        set.points.into_values().collect()
    }
}

impl fmt::Debug for OriginDimensionSpacePointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(value: &str) -> DimensionSpacePoint {
        DimensionSpacePoint::new([("language", value)])
    }

    #[test]
    fn test_set_algebra() {
        let a = DimensionSpacePointSet::new([lang("en"), lang("de")]);
        let b = DimensionSpacePointSet::new([lang("de"), lang("fr")]);

        assert_eq!(a.union(&b).len(), 3);
        assert_eq!(a.intersection(&b), DimensionSpacePointSet::single(lang("de")));
        assert_eq!(a.difference(&b), DimensionSpacePointSet::single(lang("en")));
    }

    #[test]
    fn test_equality_ignores_order_and_duplicates() {
        let a = DimensionSpacePointSet::new([lang("en"), lang("de"), lang("en")]);
        let b = DimensionSpacePointSet::new([lang("de"), lang("en")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_point_hashes_follow_insertion_order() {
        let set = DimensionSpacePointSet::new([lang("fr"), lang("en")]);
        assert_eq!(
            set.point_hashes(),
            vec![lang("fr").hash().to_string(), lang("en").hash().to_string()]
        );
    }

    #[test]
    fn test_origin_set_conversion() {
        let origins = OriginDimensionSpacePointSet::new([
            OriginDimensionSpacePoint::from(lang("en")),
            OriginDimensionSpacePoint::from(lang("de")),
        ]);
        let points = origins.to_dimension_space_point_set();
        assert!(points.contains(&lang("de")));
        assert_eq!(points.len(), 2);
    }
}
