//! Vertex masks for boundary-limited repair.

use mesh_region::Selection;

/// Which vertices a stage may modify.
#[derive(Debug, Clone)]
pub(crate) enum Mask {
    /// Every vertex.
    All,
    /// Only vertices flagged `true`; indices past the end are not allowed.
    Only(Vec<bool>),
}

impl Mask {
    pub(crate) fn from_selection(selection: &Selection, vertex_count: usize) -> Self {
        Self::Only((0..vertex_count as u32).map(|v| selection.contains(v)).collect())
    }

    #[inline]
    pub(crate) fn allows(&self, v: u32) -> bool {
        match self {
            Self::All => true,
            Self::Only(flags) => flags.get(v as usize).copied().unwrap_or(false),
        }
    }

    pub(crate) fn allows_all(&self, vertices: &[u32]) -> bool {
        vertices.iter().all(|&v| self.allows(v))
    }

    /// Follow a compaction: entry `old` moves to `remap[old]`.
    pub(crate) fn remap(&mut self, remap: &[Option<u32>], new_len: usize) {
        if let Self::Only(flags) = self {
            let mut next = vec![false; new_len];
            for (old, target) in remap.iter().enumerate() {
                if let Some(new) = target {
                    if flags.get(old).copied().unwrap_or(false) {
                        next[*new as usize] = true;
                    }
                }
            }
            *flags = next;
        }
    }
}
