//! Per-region logic trees of ground motion models, read from
//! `gmm-trees.json`.
//!
//! This is an alternative to the distance-gated weights in `gmm.xml`. The
//! calculation does not use it, but the table is loaded at start-up and a bad
//! table stops the program.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::{
    gmm::Gmm,
    region::Region,
    weights::{WeightError, WeightMapping},
};

/// Resource name of the logic-tree table.
pub const TREES_FILENAME: &str = "gmm-trees.json";

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Failed to parse logic tree table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logic tree for {region} is invalid: {source}")]
    Weights {
        region: Region,
        #[source]
        source: WeightError,
    },

    #[error("Logic tree for {0} is empty")]
    Empty(Region),

    #[error("Region {0} appears more than once")]
    DuplicateRegion(Region),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: Gmm,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicTree {
    branches: Vec<Branch>,
}

impl LogicTree {
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Collapse the branches into a weight map. Fails on repeated models.
    pub fn to_weight_mapping(&self) -> Result<WeightMapping, WeightError> {
        let mut mapping = WeightMapping::new();
        for branch in &self.branches {
            mapping.insert(branch.id, branch.weight)?;
        }
        Ok(mapping)
    }
}

impl fmt::Display for LogicTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for branch in &self.branches {
            writeln!(f, "  {:<20} [{}]", branch.id.as_str(), branch.weight)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    id: Region,
    tree: LogicTree,
}

/// Read-only table of logic trees by region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogicTreeRegistry {
    trees: BTreeMap<Region, LogicTree>,
}

impl LogicTreeRegistry {
    pub fn from_json_str(contents: &str) -> Result<Self, TreeError> {
        let entries: Vec<TreeEntry> = serde_json::from_str(contents)?;

        let mut trees = BTreeMap::new();
        for TreeEntry { id, tree } in entries {
            if tree.is_empty() {
                return Err(TreeError::Empty(id));
            }
            let mapping = tree
                .to_weight_mapping()
                .map_err(|source| TreeError::Weights { region: id, source })?;
            mapping
                .validate()
                .map_err(|source| TreeError::Weights { region: id, source })?;
            if trees.insert(id, tree).is_some() {
                return Err(TreeError::DuplicateRegion(id));
            }
        }
        Ok(Self { trees })
    }

    pub fn get(&self, region: Region) -> Option<&LogicTree> {
        self.trees.get(&region)
    }

    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.trees.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl fmt::Display for LogicTreeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (region, tree) in &self.trees {
            writeln!(f, "{region} ({})", region.label())?;
            write!(f, "{tree}")?;
        }
        Ok(())
    }
}
