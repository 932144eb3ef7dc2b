//! Vertex selections.

use mesh_types::{EdgeKey, IndexedMesh};

const WORD: usize = 64;

/// A set of vertex indices scoped to one mesh.
///
/// Stored as a bitset sized to the mesh's vertex count at the time of
/// selection. A selection is only meaningful for the mesh it was computed
/// on; recompute it after any operation that renumbers vertices.
///
/// # Example
///
/// ```
/// use mesh_region::Selection;
///
/// let a = Selection::from_indices(8, [0, 1, 2]);
/// let b = Selection::from_indices(8, [2, 3]);
/// assert_eq!(a.union(&b).len(), 4);
/// assert_eq!(a.intersect(&b).iter().collect::<Vec<_>>(), vec![2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    words: Vec<u64>,
    vertex_count: usize,
}

impl Selection {
    /// Nothing selected.
    #[must_use]
    pub fn none(vertex_count: usize) -> Self {
        Self {
            words: vec![0; vertex_count.div_ceil(WORD)],
            vertex_count,
        }
    }

    /// Every vertex selected.
    #[must_use]
    pub fn all(vertex_count: usize) -> Self {
        let mut selection = Self::none(vertex_count);
        for word in &mut selection.words {
            *word = u64::MAX;
        }
        selection.clear_tail();
        selection
    }

    /// Select the given indices; indices out of range are ignored.
    #[must_use]
    pub fn from_indices(vertex_count: usize, indices: impl IntoIterator<Item = u32>) -> Self {
        let mut selection = Self::none(vertex_count);
        for i in indices {
            selection.insert(i);
        }
        selection
    }

    /// Select vertices for which `predicate` holds.
    #[must_use]
    pub fn from_predicate(vertex_count: usize, mut predicate: impl FnMut(u32) -> bool) -> Self {
        let mut selection = Self::none(vertex_count);
        for i in 0..vertex_count as u32 {
            if predicate(i) {
                selection.insert(i);
            }
        }
        selection
    }

    /// Number of vertices the selection is scoped to.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Add a vertex. Returns `false` if it is out of range.
    pub fn insert(&mut self, index: u32) -> bool {
        let i = index as usize;
        if i >= self.vertex_count {
            return false;
        }
        self.words[i / WORD] |= 1 << (i % WORD);
        true
    }

    /// Remove a vertex.
    pub fn remove(&mut self, index: u32) {
        let i = index as usize;
        if i < self.vertex_count {
            self.words[i / WORD] &= !(1 << (i % WORD));
        }
    }

    /// Whether a vertex is selected.
    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        let i = index as usize;
        i < self.vertex_count && self.words[i / WORD] & (1 << (i % WORD)) != 0
    }

    /// Number of selected vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Selected indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            (0..WORD)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| (wi * WORD + bit) as u32)
        })
    }

    /// Vertices in either selection.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a | b)
    }

    /// Vertices in both selections.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & b)
    }

    /// Every vertex not selected.
    #[must_use]
    pub fn complement(&self) -> Self {
        let mut out = Self {
            words: self.words.iter().map(|w| !w).collect(),
            vertex_count: self.vertex_count,
        };
        out.clear_tail();
        out
    }

    fn zip_with(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        let vertex_count = self.vertex_count.max(other.vertex_count);
        let mut out = Self::none(vertex_count);
        for (i, word) in out.words.iter_mut().enumerate() {
            let a = self.words.get(i).copied().unwrap_or(0);
            let b = other.words.get(i).copied().unwrap_or(0);
            *word = op(a, b);
        }
        out.clear_tail();
        out
    }

    fn clear_tail(&mut self) {
        let rem = self.vertex_count % WORD;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }

    /// Edges of `mesh` whose two endpoints are both selected.
    #[must_use]
    pub fn edges(&self, mesh: &IndexedMesh) -> Vec<EdgeKey> {
        mesh.edges()
            .into_iter()
            .filter(|e| self.contains(e.0) && self.contains(e.1))
            .collect()
    }

    /// Faces of `mesh` whose vertices are all selected.
    #[must_use]
    pub fn faces_within(&self, mesh: &IndexedMesh) -> Vec<usize> {
        mesh.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.iter().all(|&v| self.contains(v)))
            .map(|(fi, _)| fi)
            .collect()
    }
}
