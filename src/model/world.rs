use glam::{IVec3, Vec3};

use super::raycast::Aabb;
use crate::config::WorldConfig;

/// Stable handle of a placed block. Ids are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

/// A player-placed unit cube centred on an integer coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub position: IVec3,
}

impl Block {
    pub fn center(&self) -> Vec3 {
        self.position.as_vec3()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::unit_cube(self.center())
    }
}

/// The static floor slab
#[derive(Clone, Copy, Debug)]
pub struct Ground {
    pub center: Vec3,
    pub size: Vec3,
}

impl Ground {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.center, self.size)
    }
}

/// Block registry: placed blocks in placement order plus the ground.
///
/// No spatial index; lookups and removal are linear scans by id. Several
/// blocks may share a coordinate.
pub struct World {
    blocks: Vec<Block>,
    next_id: u64,
    ground: Ground,
    /// Shared by every block
    block_color: [f32; 4],
    ground_color: [f32; 4],
}

impl World {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            blocks: Vec::new(),
            next_id: 0,
            ground: Ground { center: config.ground_center, size: config.ground_size },
            block_color: config.block_color,
            ground_color: config.ground_color,
        }
    }

    pub fn add(&mut self, x: i32, y: i32, z: i32) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        self.blocks.push(Block { id, position: IVec3::new(x, y, z) });
        id
    }

    /// Removes the block with this id, keeping the order of the rest
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let idx = self.blocks.iter().position(|b| b.id == id)?;
        Some(self.blocks.remove(idx))
    }

    pub fn all(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    pub fn block_color(&self) -> [f32; 4] {
        self.block_color
    }

    pub fn ground_color(&self) -> [f32; 4] {
        self.ground_color
    }
}
