//! Destructible cover between the player and the formation

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::rect_contains;
use crate::tuning::BarricadeTuning;

/// A single-hit block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Block {
    pub fn contains(&self, point: Vec2) -> bool {
        rect_contains(self.pos, self.size, point)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Barricade {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub struct BarricadeField {
    pub barricades: Vec<Barricade>,
    tuning: BarricadeTuning,
}

impl BarricadeField {
    pub fn new(tuning: &BarricadeTuning) -> Self {
        let mut field = Self {
            barricades: Vec::new(),
            tuning: tuning.clone(),
        };
        field.rebuild();
        field
    }

    fn block_size(&self) -> Vec2 {
        Vec2::new(self.tuning.block_width, self.tuning.block_height)
    }

    /// Left edge of each barricade, spread evenly across the field
    fn anchors(&self) -> Vec<f32> {
        let width = self.tuning.cols as f32 * self.tuning.block_width;
        let slots = self.tuning.count as f32 + 1.0;
        (1..=self.tuning.count)
            .map(|i| (i as f32 * SCREEN_WIDTH / slots).floor() - (width / 2.0).floor())
            .collect()
    }

    /// Replace every barricade with a fresh full grid
    pub fn rebuild(&mut self) {
        let size = self.block_size();
        let top = SCREEN_HEIGHT - self.tuning.bottom_offset;
        let (rows, cols) = (self.tuning.rows, self.tuning.cols);
        self.barricades = self
            .anchors()
            .into_iter()
            .map(|left| Barricade {
                blocks: (0..rows)
                    .flat_map(|row| {
                        (0..cols).map(move |col| Block {
                            pos: Vec2::new(left + col as f32 * size.x, top + row as f32 * size.y),
                            size,
                        })
                    })
                    .collect(),
            })
            .collect();
    }

    /// Rebuild from saved block positions, one list per barricade
    pub fn restore(&mut self, saved: &[Vec<Vec2>]) -> Result<(), String> {
        if saved.len() != self.tuning.count {
            return Err(format!(
                "expected {} barricades, found {}",
                self.tuning.count,
                saved.len()
            ));
        }
        if saved.iter().flatten().any(|p| !p.is_finite()) {
            return Err("non-finite barricade block position".to_string());
        }
        let size = self.block_size();
        self.barricades = saved
            .iter()
            .map(|blocks| Barricade {
                blocks: blocks.iter().map(|&pos| Block { pos, size }).collect(),
            })
            .collect();
        Ok(())
    }

    /// Block coordinates per barricade (what a save needs)
    pub fn block_positions(&self) -> Vec<Vec<Vec2>> {
        self.barricades
            .iter()
            .map(|b| b.blocks.iter().map(|block| block.pos).collect())
            .collect()
    }

    pub fn block_count(&self) -> usize {
        self.barricades.iter().map(|b| b.blocks.len()).sum()
    }

    /// First block containing `point`, as (barricade, block) indices
    pub fn hit_test(&self, point: Vec2) -> Option<(usize, usize)> {
        self.barricades.iter().enumerate().find_map(|(bi, barricade)| {
            barricade
                .blocks
                .iter()
                .position(|block| block.contains(point))
                .map(|i| (bi, i))
        })
    }

    pub fn remove_block(&mut self, barricade: usize, block: usize) -> Option<Block> {
        let blocks = &mut self.barricades.get_mut(barricade)?.blocks;
        (block < blocks.len()).then(|| blocks.remove(block))
    }
}
