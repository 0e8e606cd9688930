//! a derived, read-only snapshot of a grid for textual rendering
use super::{Delta, Grid};
use crate::types::{Glyph, Position};
use itertools::Itertools;
use std::fmt::{self, Debug};

/// A snapshot of a grid's per-cell classifications, taken once at
/// construction and thereafter kept in sync only by explicitly applying
/// every delta drained from [`Grid::get_updates`]. There is no subscription
/// mechanism and the snapshot never re-reads the grid on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRepresentation<K> {
    width: u32,
    height: u32,
    cells: Vec<Option<K>>,
}

impl<K: Copy + Eq + Debug> GridRepresentation<K> {
    /// snapshots the full occupancy of the given grid
    pub fn new(grid: &Grid<K>) -> Self {
        let cells = (0..grid.height() as i32)
            .cartesian_product(0..grid.width() as i32)
            .map(|(y, x)| grid.occupant_at(Position { x, y }).map(|o| o.kind))
            .collect_vec();

        GridRepresentation {
            width: grid.width(),
            height: grid.height(),
            cells,
        }
    }

    /// applies one cell change to the snapshot
    pub fn update(&mut self, delta: &Delta<K>) {
        let index = delta.position.y as usize * self.width as usize + delta.position.x as usize;
        self.cells[index] = delta.occupant.map(|o| o.kind);
    }

    /// the classification recorded for a cell, if any
    pub fn entity_at(&self, position: Position) -> Option<K> {
        self.cells[position.y as usize * self.width as usize + position.x as usize]
    }
}

impl<K: Glyph + Copy> fmt::Display for GridRepresentation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height as usize {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.width as usize {
                if x > 0 {
                    write!(f, " ")?;
                }
                match self.cells[y * self.width as usize + x] {
                    Some(kind) => write!(f, "{}", kind.glyph())?,
                    None => write!(f, "{}", K::EMPTY)?,
                }
            }
        }
        Ok(())
    }
}
