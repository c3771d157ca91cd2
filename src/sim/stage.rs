//! Stage layouts and brick grid construction
//!
//! A stage is a static table of health values (rows of columns, 0 = empty
//! cell, 1-3 = brick tier). Tables are validated once, when loaded, so that
//! stage init can only fail on an out-of-range stage number.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::Rect;
use super::state::Brick;
use crate::consts::*;

/// Stage table errors. All of them are configuration errors.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage table has no stages")]
    NoStages,

    #[error("stage {index} does not exist (table has {count} stages)")]
    UnknownStage { index: usize, count: usize },

    #[error("stage {stage} has no bricks")]
    EmptyLayout { stage: usize },

    #[error("stage {stage} row {row} has {found} cells, expected {expected}")]
    RaggedLayout {
        stage: usize,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("stage {stage} cell ({row}, {column}) has health {value}, tiers are 0-3")]
    InvalidHealth {
        stage: usize,
        row: usize,
        column: usize,
        value: u8,
    },

    #[error("stage {stage} grid is {rows}x{columns}, too large for the canvas")]
    GridTooLarge {
        stage: usize,
        rows: usize,
        columns: usize,
    },

    #[error("invalid stage table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One stage's brick layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageLayout {
    #[serde(default)]
    pub name: String,
    /// Health per cell, `rows[row][column]`
    pub rows: Vec<Vec<u8>>,
}

impl StageLayout {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Check shape and values. `stage` is the 1-based stage number used in errors.
    pub fn validate(&self, stage: usize) -> Result<(), StageError> {
        let rows = self.row_count();
        let columns = self.column_count();
        if rows == 0 || columns == 0 {
            return Err(StageError::EmptyLayout { stage });
        }
        if rows > MAX_GRID_ROWS || columns > MAX_GRID_COLUMNS {
            return Err(StageError::GridTooLarge {
                stage,
                rows,
                columns,
            });
        }

        let mut bricks = 0;
        for (row, cells) in self.rows.iter().enumerate() {
            if cells.len() != columns {
                return Err(StageError::RaggedLayout {
                    stage,
                    row,
                    expected: columns,
                    found: cells.len(),
                });
            }
            for (column, &value) in cells.iter().enumerate() {
                if value > MAX_BRICK_HEALTH {
                    return Err(StageError::InvalidHealth {
                        stage,
                        row,
                        column,
                        value,
                    });
                }
                if value > 0 {
                    bricks += 1;
                }
            }
        }

        if bricks == 0 {
            return Err(StageError::EmptyLayout { stage });
        }
        Ok(())
    }

    /// Materialise the brick grid. Bricks are ordered column-major, then by
    /// row, which is also the collision scan order.
    pub fn build_bricks(&self) -> Vec<Brick> {
        let mut bricks = Vec::new();
        for column in 0..self.column_count() {
            for (row, cells) in self.rows.iter().enumerate() {
                let health = cells.get(column).copied().unwrap_or(0);
                if health > 0 {
                    bricks.push(Brick::new(column, row, cell_rect(column, row), health));
                }
            }
        }
        bricks
    }
}

/// Pixel rectangle of a grid cell
pub fn cell_rect(column: usize, row: usize) -> Rect {
    Rect::new(
        Vec2::new(
            column as f32 * (BRICK_WIDTH + BRICK_PADDING) + BRICK_OFFSET_LEFT,
            row as f32 * (BRICK_HEIGHT + BRICK_PADDING) + BRICK_OFFSET_TOP,
        ),
        Vec2::new(BRICK_WIDTH, BRICK_HEIGHT),
    )
}

/// Ordered, validated list of stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StageTable {
    stages: Vec<StageLayout>,
}

impl StageTable {
    pub fn new(stages: Vec<StageLayout>) -> Result<Self, StageError> {
        if stages.is_empty() {
            return Err(StageError::NoStages);
        }
        for (i, stage) in stages.iter().enumerate() {
            stage.validate(i + 1)?;
        }
        Ok(Self { stages })
    }

    /// Load from a JSON array of `{ "name": ..., "rows": [[...], ...] }`
    pub fn from_json(json: &str) -> Result<Self, StageError> {
        let stages: Vec<StageLayout> = serde_json::from_str(json)?;
        Self::new(stages)
    }

    /// The three stages shipped with the game
    pub fn builtin() -> Self {
        Self {
            stages: vec![
                StageLayout::new(
                    "Boot Sector",
                    vec![
                        vec![2, 2, 2, 2, 2, 2, 2, 2, 2],
                        vec![2, 2, 2, 2, 2, 2, 2, 2, 2],
                        vec![1, 1, 1, 1, 1, 1, 1, 1, 1],
                        vec![1, 1, 1, 1, 1, 1, 1, 1, 1],
                        vec![1, 1, 1, 1, 1, 1, 1, 1, 1],
                        vec![1, 1, 1, 1, 1, 1, 1, 1, 1],
                    ],
                ),
                StageLayout::new(
                    "Firewall",
                    vec![
                        vec![3, 0, 2, 2, 2, 2, 2, 0, 3],
                        vec![2, 2, 1, 1, 1, 1, 1, 2, 2],
                        vec![1, 1, 1, 0, 3, 0, 1, 1, 1],
                        vec![1, 1, 1, 0, 3, 0, 1, 1, 1],
                        vec![2, 2, 1, 1, 1, 1, 1, 2, 2],
                        vec![0, 1, 1, 1, 1, 1, 1, 1, 0],
                    ],
                ),
                StageLayout::new(
                    "Kernel",
                    vec![
                        vec![3, 3, 3, 3, 3, 3, 3, 3, 3],
                        vec![3, 2, 2, 2, 2, 2, 2, 2, 3],
                        vec![3, 2, 1, 1, 1, 1, 1, 2, 3],
                        vec![3, 2, 1, 0, 0, 0, 1, 2, 3],
                        vec![3, 2, 1, 1, 1, 1, 1, 2, 3],
                        vec![2, 2, 2, 2, 2, 2, 2, 2, 2],
                    ],
                ),
            ],
        }
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Look up a stage by its 1-based number
    pub fn get(&self, stage: usize) -> Result<&StageLayout, StageError> {
        stage
            .checked_sub(1)
            .and_then(|i| self.stages.get(i))
            .ok_or(StageError::UnknownStage {
                index: stage,
                count: self.stages.len(),
            })
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self::builtin()
    }
}
