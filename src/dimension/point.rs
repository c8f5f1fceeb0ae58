//! Dimension space points
//!
//! A dimension space point is an immutable coordinate in the configured dimension space,
//! identified by a deterministic hash over its canonical (sorted) JSON form.

use super::DimensionSpaceError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Immutable coordinate map: dimension name to dimension value
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct DimensionSpacePoint {
    coordinates: BTreeMap<String, String>,
    hash: String,
}

impl DimensionSpacePoint {
    /// Create a point from coordinates
    pub fn new<K, V>(coordinates: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let coordinates: BTreeMap<String, String> = coordinates
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from(coordinates)
    }

    /// The distinguished empty point, where root nodes live
    pub fn empty() -> Self {
        Self::from(BTreeMap::new())
    }

    /// Parse a point from its JSON object form
    pub fn from_json(json: &str) -> Result<Self, DimensionSpaceError> {
        let coordinates: BTreeMap<String, String> = serde_json::from_str(json)
            .map_err(|e| DimensionSpaceError::InvalidPoint(e.to_string()))?;
        Ok(Self::from(coordinates))
    }

    /// Deterministic hash key of the point
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// All coordinates
    pub fn coordinates(&self) -> &BTreeMap<String, String> {
        &self.coordinates
    }

    /// Value of one dimension
    pub fn coordinate(&self, dimension: &str) -> Option<&str> {
        self.coordinates.get(dimension).map(String::as_str)
    }

    /// A copy of this point with one coordinate replaced
    pub fn vary(&self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        let mut coordinates = self.coordinates.clone();
        coordinates.insert(dimension.into(), value.into());
        Self::from(coordinates)
    }

    /// Whether this is the empty point
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Canonical JSON form used for hashing and display
    pub fn to_json(&self) -> String {
        canonical_json(&self.coordinates)
    }
}

fn canonical_json(coordinates: &BTreeMap<String, String>) -> String {
    // BTreeMap keys are sorted, so serialization is canonical.
    serde_json::to_string(coordinates).unwrap_or_default()
}

impl From<BTreeMap<String, String>> for DimensionSpacePoint {
    fn from(coordinates: BTreeMap<String, String>) -> Self {
        let hash = blake3::hash(canonical_json(&coordinates).as_bytes())
            .to_hex()
            .to_string();
        Self { coordinates, hash }
    }
}

impl From<DimensionSpacePoint> for BTreeMap<String, String> {
    fn from(point: DimensionSpacePoint) -> Self {
        point.coordinates
    }
}

impl PartialEq for DimensionSpacePoint {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for DimensionSpacePoint {}

impl Hash for DimensionSpacePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl PartialOrd for DimensionSpacePoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DimensionSpacePoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.coordinates.cmp(&other.coordinates)
    }
}

impl fmt::Debug for DimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DimensionSpacePoint({})", self.to_json())
    }
}

impl fmt::Display for DimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

/// The point where a node's content is authored
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginDimensionSpacePoint(DimensionSpacePoint);

impl OriginDimensionSpacePoint {
    /// Create an origin from coordinates
    pub fn new<K, V>(coordinates: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(DimensionSpacePoint::new(coordinates))
    }

    /// The empty origin, used by root nodes
    pub fn empty() -> Self {
        Self(DimensionSpacePoint::empty())
    }

    /// The origin as a plain point
    pub fn to_dimension_space_point(&self) -> DimensionSpacePoint {
        self.0.clone()
    }

    /// Borrow the origin as a plain point
    pub fn as_dimension_space_point(&self) -> &DimensionSpacePoint {
        &self.0
    }

    /// Deterministic hash key
    pub fn hash(&self) -> &str {
        self.0.hash()
    }
}

impl From<DimensionSpacePoint> for OriginDimensionSpacePoint {
    fn from(point: DimensionSpacePoint) -> Self {
        Self(point)
    }
}

impl fmt::Debug for OriginDimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OriginDimensionSpacePoint({})", self.0.to_json())
    }
}

impl fmt::Display for OriginDimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_independent_of_insertion_order() {
        let a = DimensionSpacePoint::new([("language", "de"), ("market", "CH")]);
        let b = DimensionSpacePoint::new([("market", "CH"), ("language", "de")]);
        assert_eq!(a, b);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_distinct_points_have_distinct_hashes() {
        let de = DimensionSpacePoint::new([("language", "de")]);
        let en = DimensionSpacePoint::new([("language", "en")]);
        assert_ne!(de.hash(), en.hash());
        assert_eq!(de.vary("language", "en"), en);
    }

    #[test]
    fn test_json_round_trip_keeps_hash() {
        let point = DimensionSpacePoint::new([("language", "de")]);
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"language":"de"}"#);
        let parsed = DimensionSpacePoint::from_json(&json).unwrap();
        assert_eq!(parsed.hash(), point.hash());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(DimensionSpacePoint::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_empty_point() {
        let empty = DimensionSpacePoint::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.to_json(), "{}");
        assert_eq!(OriginDimensionSpacePoint::empty().hash(), empty.hash());
    }
}
