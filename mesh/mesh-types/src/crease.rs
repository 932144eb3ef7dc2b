//! Per-edge crease weights.

use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An undirected edge, stored with the smaller vertex index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeKey(pub u32, pub u32);

impl EdgeKey {
    /// Normalize an edge so the smaller index comes first.
    #[inline]
    #[must_use]
    pub const fn new(a: u32, b: u32) -> Self {
        if a < b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Whether `v` is one of the endpoints.
    #[inline]
    #[must_use]
    pub const fn touches(&self, v: u32) -> bool {
        self.0 == v || self.1 == v
    }

    /// The endpoint that is not `v`.
    #[inline]
    #[must_use]
    pub const fn other(&self, v: u32) -> u32 {
        if self.0 == v {
            self.1
        } else {
            self.0
        }
    }
}

/// Crease weights in `[0, 1]` attached to mesh edges.
///
/// Weight 1 marks a hard fold that subdivision never smooths across.
/// A weight of 0 is never stored, so an absent edge and an uncreased edge
/// are the same thing.
///
/// Serialized as a sorted list of `(edge, weight)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "Vec<(EdgeKey, f64)>", from = "Vec<(EdgeKey, f64)>"))]
pub struct CreaseMap {
    weights: HashMap<EdgeKey, f64>,
}

impl CreaseMap {
    /// Create an empty crease map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight of an edge, clamped to `[0, 1]`. Zero clears it.
    pub fn set(&mut self, a: u32, b: u32, weight: f64) {
        let key = EdgeKey::new(a, b);
        let weight = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        if weight > 0.0 {
            self.weights.insert(key, weight);
        } else {
            self.weights.remove(&key);
        }
    }

    /// Weight of an edge, 0 when uncreased.
    #[inline]
    #[must_use]
    pub fn get(&self, a: u32, b: u32) -> f64 {
        self.weights.get(&EdgeKey::new(a, b)).copied().unwrap_or(0.0)
    }

    /// Whether the edge carries the full weight of 1.
    #[inline]
    #[must_use]
    pub fn is_sharp(&self, a: u32, b: u32) -> bool {
        self.get(a, b) >= 1.0
    }

    /// Number of creased edges.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether no edge is creased.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Remove every crease.
    pub fn clear(&mut self) {
        self.weights.clear();
    }

    /// Iterate over creased edges and their weights.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeKey, f64)> + '_ {
        self.weights.iter().map(|(k, w)| (*k, *w))
    }

    /// Rewrite edge endpoints through a vertex remap.
    ///
    /// `remap[old]` is the new index, or `None` when the vertex was removed.
    /// Edges losing an endpoint or collapsing to a point are dropped. When
    /// two edges merge the larger weight wins.
    pub fn remap(&mut self, remap: &[Option<u32>]) {
        if self.weights.is_empty() {
            return;
        }
        let old = std::mem::take(&mut self.weights);
        for (key, weight) in old {
            let a = remap.get(key.0 as usize).copied().flatten();
            let b = remap.get(key.1 as usize).copied().flatten();
            if let (Some(a), Some(b)) = (a, b) {
                if a != b {
                    let entry = self.weights.entry(EdgeKey::new(a, b)).or_insert(0.0);
                    *entry = entry.max(weight);
                }
            }
        }
    }

    /// Keep only edges accepted by the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(EdgeKey) -> bool) {
        self.weights.retain(|k, _| keep(*k));
    }
}

impl From<CreaseMap> for Vec<(EdgeKey, f64)> {
    fn from(map: CreaseMap) -> Self {
        let mut pairs: Self = map.weights.into_iter().collect();
        pairs.sort_by_key(|&(key, _)| key);
        pairs
    }
}

impl From<Vec<(EdgeKey, f64)>> for CreaseMap {
    fn from(pairs: Vec<(EdgeKey, f64)>) -> Self {
        let mut map = Self::new();
        for (key, weight) in pairs {
            map.set(key.0, key.1, weight);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_key_is_normalized() {
        assert_eq!(EdgeKey::new(5, 2), EdgeKey(2, 5));
        assert_eq!(EdgeKey::new(2, 5).other(2), 5);
        assert!(EdgeKey::new(2, 5).touches(5));
    }

    #[test]
    fn weights_are_clamped_and_zero_clears() {
        let mut creases = CreaseMap::new();
        creases.set(0, 1, 3.0);
        creases.set(1, 2, 0.25);
        assert_eq!(creases.get(1, 0), 1.0);
        assert!(creases.is_sharp(0, 1));
        assert!(!creases.is_sharp(1, 2));

        creases.set(2, 1, 0.0);
        assert_eq!(creases.len(), 1);
        creases.set(0, 1, f64::NAN);
        assert!(creases.is_empty());
    }

    #[test]
    fn remap_drops_collapsed_edges() {
        let mut creases = CreaseMap::new();
        creases.set(0, 1, 1.0);
        creases.set(1, 2, 0.5);
        creases.set(2, 3, 0.75);

        // 1 and 2 merge, 3 is deleted.
        creases.remap(&[Some(0), Some(1), Some(1), None]);
        assert_eq!(creases.len(), 1);
        assert_eq!(creases.get(0, 1), 1.0);
    }

    #[test]
    fn pairs_are_sorted_and_clamped() {
        let mut creases = CreaseMap::new();
        creases.set(4, 3, 0.5);
        creases.set(0, 1, 1.0);
        let pairs: Vec<(EdgeKey, f64)> = creases.clone().into();
        assert_eq!(pairs, vec![(EdgeKey(0, 1), 1.0), (EdgeKey(3, 4), 0.5)]);

        let back = CreaseMap::from(vec![(EdgeKey(7, 2), 4.0), (EdgeKey(1, 2), 0.0)]);
        assert_eq!(back.len(), 1);
        assert_eq!(back.get(2, 7), 1.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip() {
        let mut creases = CreaseMap::new();
        creases.set(0, 1, 1.0);
        creases.set(2, 5, 0.25);
        let json = serde_json::to_string(&creases).unwrap();
        assert_eq!(json, "[[[0,1],1.0],[[2,5],0.25]]");
        let back: CreaseMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, creases);
    }
}
