use std::fmt;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingSite, BUILDING_FOOTPRINT};

pub const NODE_FOOTPRINT: f64 = 42.0;
pub const REGROW_DELAY_YEARS: u32 = 5;
const PLACEMENT_ATTEMPTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Tree,
    Rock,
}

impl NodeKind {
    pub fn max_hp(self) -> u32 {
        match self {
            NodeKind::Tree => 3,
            NodeKind::Rock => 2,
        }
    }

    /// Gatherer work needed to clear the node.
    pub fn work_required(self) -> f64 {
        match self {
            NodeKind::Tree => 8.0,
            NodeKind::Rock => 6.0,
        }
    }

    pub fn materials_yield(self) -> f64 {
        match self {
            NodeKind::Tree => 4.0,
            NodeKind::Rock => 5.0,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Tree => f.write_str("tree"),
            NodeKind::Rock => f.write_str("rock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub hp: u32,
}

impl ResourceNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            x,
            y,
            hp: kind.max_hp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatherJob {
    pub id: u64,
    pub node_id: String,
    pub kind: NodeKind,
    pub progress: f64,
    pub required: f64,
}

impl GatherJob {
    pub fn new(id: u64, node: &ResourceNode) -> Self {
        Self {
            id,
            node_id: node.id.clone(),
            kind: node.kind,
            progress: 0.0,
            required: node.kind.work_required(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.required
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegrowEntry {
    pub node: ResourceNode,
    pub regen_year: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundBounds {
    pub width: f64,
    pub height: f64,
}

impl Default for GroundBounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 420.0,
        }
    }
}

fn overlaps_building(x: f64, y: f64, buildings: &[BuildingSite]) -> bool {
    buildings.iter().any(|b| {
        x < b.x + BUILDING_FOOTPRINT
            && x + NODE_FOOTPRINT > b.x
            && y < b.y + BUILDING_FOOTPRINT
            && y + NODE_FOOTPRINT > b.y
    })
}

fn random_position(bounds: &GroundBounds, rng: &mut dyn RngCore) -> (f64, f64) {
    let x = 30.0 + rng.gen::<f64>() * (bounds.width - 100.0).max(1.0);
    let y = 10.0 + rng.gen::<f64>() * (bounds.height - 60.0).max(1.0);
    (x, y)
}

/// Picks a spot clear of every building footprint. Falls back to an unchecked
/// spot once the attempts run out.
pub fn find_clear_position(
    bounds: &GroundBounds,
    buildings: &[BuildingSite],
    rng: &mut dyn RngCore,
) -> (f64, f64) {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let (x, y) = random_position(bounds, rng);
        if !overlaps_building(x, y, buildings) {
            return (x, y);
        }
    }
    random_position(bounds, rng)
}

pub fn spawn_initial_nodes(
    trees: usize,
    rocks: usize,
    bounds: &GroundBounds,
    buildings: &[BuildingSite],
    rng: &mut dyn RngCore,
) -> Vec<ResourceNode> {
    let mut nodes = Vec::with_capacity(trees + rocks);
    for i in 0..trees {
        let (x, y) = find_clear_position(bounds, buildings, rng);
        nodes.push(ResourceNode::new(format!("tree{i}"), NodeKind::Tree, x, y));
    }
    for i in 0..rocks {
        let (x, y) = find_clear_position(bounds, buildings, rng);
        nodes.push(ResourceNode::new(format!("rock{i}"), NodeKind::Rock, x, y));
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::{BuildingId, BuildingKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn spawned_nodes_avoid_buildings() {
        let buildings = vec![
            BuildingSite::completed(BuildingId(1), BuildingKind::Farm, 150.0, 100.0),
            BuildingSite::completed(BuildingId(2), BuildingKind::House, 200.0, 40.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let nodes = spawn_initial_nodes(5, 3, &GroundBounds::default(), &buildings, &mut rng);
        assert_eq!(nodes.len(), 8);
        assert_eq!(nodes.iter().filter(|n| n.kind == NodeKind::Tree).count(), 5);
        assert!(nodes.iter().all(|n| n.hp == n.kind.max_hp()));
        assert!(nodes
            .iter()
            .all(|n| !overlaps_building(n.x, n.y, &buildings)));
    }
}
