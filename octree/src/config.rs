use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use isotree_util::{Octant, CORNERS};

use crate::corner::MAX_CORNER_DEPTH;
use crate::tree::Octree;

/// Describes the shape of a tree to build: a perfect octree of `full_depth` levels, with the
/// nodes named by `refine` created on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default)]
    pub full_depth: u32,
    /// Paths of octant codes from the root.
    #[serde(default)]
    pub refine: Vec<Vec<u8>>,
    /// Depth of the grid corner keys are computed on.
    #[serde(default = "TreeConfig::default_corner_depth")]
    pub corner_depth: u32,
}

impl TreeConfig {
    pub fn default_corner_depth() -> u32 {
        8
    }

    pub fn validate(&self) -> Result<()> {
        if self.corner_depth > MAX_CORNER_DEPTH {
            bail!(
                "corner_depth {} exceeds the maximum of {}",
                self.corner_depth,
                MAX_CORNER_DEPTH
            );
        }

        if self.full_depth > self.corner_depth {
            bail!(
                "full_depth {} is deeper than corner_depth {}",
                self.full_depth,
                self.corner_depth
            );
        }

        for path in &self.refine {
            if path.len() as u32 > self.corner_depth {
                bail!(
                    "refinement path {:?} is deeper than corner_depth {}",
                    path,
                    self.corner_depth
                );
            }
            if let Some(code) = path.iter().find(|&&code| code as usize >= CORNERS) {
                bail!("refinement path {:?} has invalid octant {}", path, code);
            }
        }

        Ok(())
    }

    pub fn build<T: Default>(&self) -> Result<Octree<T>> {
        self.validate()?;

        let mut tree = Octree::new();
        let root = tree.root();
        tree.set_full_depth(root, self.full_depth)?;

        for path in &self.refine {
            let octants: Vec<Octant> = path
                .iter()
                .map(|&code| Octant::from_index(code as usize))
                .collect();
            tree.ensure_path(root, &octants)?;
        }

        log::info!(
            "built tree with {} nodes, {} leaves, max depth {}",
            tree.len(),
            tree.leaves(root),
            tree.max_depth(root)
        );
        Ok(tree)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            full_depth: 0,
            refine: Vec::new(),
            corner_depth: Self::default_corner_depth(),
        }
    }
}
