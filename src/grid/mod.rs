//! a generic 2d occupancy grid with toroidal wrap and an incremental
//! change log
//!
//! The grid is parameterized over an entity classification type `K` and has
//! no knowledge of any particular game. It owns every block it tracks; all
//! coordinate mutation flows through the grid so that wrap correction and
//! the occupancy table can never diverge. Each successful add, move or
//! remove appends a [`Delta`] to an internal log which consumers drain with
//! [`Grid::get_updates`] and replay, in order, against their own view of the
//! board (see [`GridRepresentation`]).
mod representation;

pub use representation::GridRepresentation;

use crate::types::Position;
use fxhash::FxHashMap;
use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::fmt::Debug;
use thiserror::Error;

/// token to identify a block on a grid. Ids are assigned by the grid and are
/// never reused within one grid's lifetime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct BlockId(pub u32);

impl BlockId {
    /// convert this block ID to a usize
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

/// A single occupant of one grid cell: a classification tag plus the
/// wrap-corrected cell it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<K> {
    kind: K,
    position: Position,
}

impl<K: Copy> Block<K> {
    /// the entity classification of this block
    pub fn kind(&self) -> K {
        self.kind
    }

    /// the wrap-corrected cell this block occupies
    pub fn position(&self) -> Position {
        self.position
    }
}

/// What a cell reports as its occupant: the block's id and classification.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant<K> {
    /// id of the occupying block
    pub id: BlockId,
    /// classification of the occupying block
    pub kind: K,
}

/// A single cell change: the cell at `position` now holds `occupant`, or
/// nothing. Deltas are emitted in chronological order and later deltas
/// supersede earlier ones for the same cell, so consumers must apply them
/// in order.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta<K> {
    /// the new occupant of the cell, if any
    pub occupant: Option<Occupant<K>>,
    /// the cell that changed
    pub position: Position,
}

/// To be raised when two blocks claim the same cell on a grid
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cell {position} is already claimed by {existing:?}, challenged by a {challenger:?}")]
pub struct CollisionError<K: Debug> {
    /// the block already occupying the contested cell
    pub existing: Occupant<K>,
    /// classification of the block that tried to claim the cell
    pub challenger: K,
    /// the contested cell
    pub position: Position,
}

/// errors raised by grid operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError<K: Debug> {
    /// an add or move targeted an occupied cell
    #[error(transparent)]
    Collision(#[from] CollisionError<K>),
    /// the operation referenced a block this grid does not track. This is
    /// caller misuse, not a game event, and performs no mutation.
    #[error("block {0:?} is not in the grid")]
    BlockNotInGrid(BlockId),
}

/// A 2d occupancy store over blocks classified by `K`. Coordinates are
/// toroidal: anything out of range is reduced modulo width/height before it
/// touches the occupancy table, so a head walking off one edge comes back
/// on the opposite one.
#[derive(Debug, Clone)]
pub struct Grid<K> {
    width: u32,
    height: u32,
    cells: Vec<Option<BlockId>>,
    blocks: FxHashMap<BlockId, Block<K>>,
    deltas: Vec<Delta<K>>,
    next_id: u32,
}

impl<K: Copy + Eq + Debug> Grid<K> {
    /// makes an empty grid. panics if either dimension is zero, since wrap
    /// correction is modulo the dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        Grid {
            width,
            height,
            cells: vec![None; (width * height) as usize],
            blocks: FxHashMap::default(),
            deltas: Vec::new(),
            next_id: 0,
        }
    }

    /// width of the grid in cells
    pub fn width(&self) -> u32 {
        self.width
    }

    /// height of the grid in cells
    pub fn height(&self) -> u32 {
        self.height
    }

    /// number of blocks currently tracked
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// reduces a position modulo the grid dimensions
    pub fn wrap(&self, position: Position) -> Position {
        Position {
            x: position.x.rem_euclid(self.width as i32),
            y: position.y.rem_euclid(self.height as i32),
        }
    }

    // index into the flat cell table. position must already be wrapped.
    fn cell_index(&self, position: Position) -> usize {
        position.y as usize * self.width as usize + position.x as usize
    }

    /// the occupant of the given cell, if any. The position is
    /// wrap-corrected first.
    pub fn occupant_at(&self, position: Position) -> Option<Occupant<K>> {
        let position = self.wrap(position);
        let id = self.cells[self.cell_index(position)]?;
        let block = self.blocks.get(&id)?;
        Some(Occupant {
            id,
            kind: block.kind,
        })
    }

    /// the current cell of a tracked block
    pub fn position_of(&self, id: BlockId) -> Option<Position> {
        self.blocks.get(&id).map(|block| block.position)
    }

    /// a shared view of a tracked block
    pub fn get_block(&self, id: BlockId) -> Option<&Block<K>> {
        self.blocks.get(&id)
    }

    /// iterates every cell with no occupant, in row-major order
    pub fn free_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32)
            .cartesian_product(0..self.width as i32)
            .map(|(y, x)| Position { x, y })
            .filter(move |position| self.occupant_at(*position).is_none())
    }

    /// Adds a new block of the given classification at the (wrap-corrected)
    /// position and returns its id. Fails with [`CollisionError`] if the
    /// cell is already occupied, in which case the grid is left untouched.
    pub fn add_block(&mut self, kind: K, position: Position) -> Result<BlockId, CollisionError<K>> {
        let position = self.wrap(position);
        if let Some(existing) = self.occupant_at(position) {
            return Err(CollisionError {
                existing,
                challenger: kind,
                position,
            });
        }

        let id = BlockId(self.next_id);
        self.next_id += 1;
        self.blocks.insert(id, Block { kind, position });
        let index = self.cell_index(position);
        self.cells[index] = Some(id);
        self.deltas.push(Delta {
            occupant: Some(Occupant { id, kind }),
            position,
        });
        Ok(id)
    }

    /// Removes a block from the grid, clearing its cell and logging a
    /// vacancy delta. Removing an id the grid does not track is a no-op.
    pub fn remove_block(&mut self, id: BlockId) {
        if let Some(block) = self.blocks.remove(&id) {
            self.clear_cell(block.position);
        }
    }

    /// Relocates a tracked block to the (wrap-corrected) destination.
    ///
    /// Not atomic on collision: the old cell is vacated and logged before
    /// the destination is claimed, so when the destination is occupied this
    /// returns [`GridError::Collision`] with the block already off the
    /// occupancy table (its recorded position is the destination). The
    /// snake's eat-apple path relies on exactly this: it removes the apple
    /// and retries the same move.
    pub fn move_block(&mut self, id: BlockId, to: Position) -> Result<(), GridError<K>> {
        let (kind, old) = match self.blocks.get(&id) {
            Some(block) => (block.kind, block.position),
            None => return Err(GridError::BlockNotInGrid(id)),
        };

        let to = self.wrap(to);
        self.clear_cell(old);
        if let Some(block) = self.blocks.get_mut(&id) {
            block.position = to;
        }

        // the old cell was the only cell holding this id, so any occupant
        // found here is a different block
        if let Some(existing) = self.occupant_at(to) {
            return Err(CollisionError {
                existing,
                challenger: kind,
                position: to,
            }
            .into());
        }

        let index = self.cell_index(to);
        self.cells[index] = Some(id);
        self.deltas.push(Delta {
            occupant: Some(Occupant { id, kind }),
            position: to,
        });
        Ok(())
    }

    /// Returns every delta accumulated since the last drain and clears the
    /// log. Consume-once: a delta handed out here is never handed out again,
    /// so the caller must apply all of them, in order, before draining
    /// again.
    pub fn get_updates(&mut self) -> Vec<Delta<K>> {
        std::mem::take(&mut self.deltas)
    }

    // position must already be wrapped
    fn clear_cell(&mut self, position: Position) {
        let index = self.cell_index(position);
        self.cells[index] = None;
        self.deltas.push(Delta {
            occupant: None,
            position,
        });
    }
}
