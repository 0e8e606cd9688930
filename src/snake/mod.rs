//! snake domain rules composed on top of the generic occupancy grid
//!
//! [`SnakeGrid`] owns a [`Grid`] and a head-to-tail list of body segments
//! and implements movement, growth-on-eating, apple spawning and scoring
//! purely in terms of the grid's add/move/remove primitives. The grid has
//! no knowledge of snake semantics; everything snake-shaped lives here.
use crate::grid::{BlockId, CollisionError, Delta, Grid, GridError};
use crate::types::{Direction, Glyph, Position};
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

/// entity classifications used by the snake game
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnakeEntity {
    #[allow(missing_docs)]
    Apple,
    #[allow(missing_docs)]
    Snake,
    #[allow(missing_docs)]
    Obstacle,
}

impl Glyph for SnakeEntity {
    const EMPTY: char = 'X';

    fn glyph(&self) -> char {
        match self {
            SnakeEntity::Apple => 'A',
            SnakeEntity::Snake => 'S',
            SnakeEntity::Obstacle => 'O',
        }
    }
}

/// One segment of the snake body: the grid block it corresponds to plus a
/// creation-time label. The label is the segment's index at the moment it
/// was created (0 = head, increasing toward the tail) and is never updated
/// afterwards; render layers use it to tell the head apart from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeBlock {
    id: BlockId,
    body_index: u16,
}

impl SnakeBlock {
    /// the grid block backing this segment
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// the creation-time body index label
    pub fn body_index(&self) -> u16 {
        self.body_index
    }
}

/// what happened on a movement tick that did not end the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// the snake advanced one cell
    Moved,
    /// the snake ate an apple and grew by one segment
    Grew,
}

/// errors raised by the snake domain
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeError {
    /// The snake ran into something it cannot eat, or a spawn targeted an
    /// occupied cell. When this escapes [`SnakeGrid::move_snake`] it is
    /// fatal to the game session; the enclosing loop decides what a game
    /// over looks like.
    #[error(transparent)]
    Collision(#[from] CollisionError<SnakeEntity>),
    /// a second snake was added to a grid that already has one
    #[error("a snake already exists on this grid")]
    SnakeAlreadyExists,
    /// a snake operation was called before `add_snake`
    #[error("no snake has been added to this grid")]
    NoSnake,
    /// no free cell is left in the apple spawn region
    #[error("no free cell is available for an apple")]
    GridFull,
    /// a grid primitive failed in a way that is not a collision
    #[error(transparent)]
    Grid(#[from] GridError<SnakeEntity>),
}

/// A grid with exactly one snake on it.
///
/// The game loop drives this with `set_direction` and one `move_snake` per
/// logical tick, then drains `get_updates` to re-render the cells that
/// changed. All operations are synchronous; nothing here is safe to mutate
/// from more than one thread at a time.
#[derive(Debug, Clone)]
pub struct SnakeGrid {
    grid: Grid<SnakeEntity>,
    direction: Direction,
    snake: Vec<SnakeBlock>,
    score: u32,
    apple_eaten: bool,
    last_tail_position: Option<Position>,
}

impl SnakeGrid {
    /// makes an empty snake grid with the snake heading right
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_direction(width, height, Direction::Right)
    }

    /// makes an empty snake grid with the given initial direction
    pub fn with_direction(width: u32, height: u32, direction: Direction) -> Self {
        SnakeGrid {
            grid: Grid::new(width, height),
            direction,
            snake: Vec::new(),
            score: 0,
            apple_eaten: false,
            last_tail_position: None,
        }
    }

    /// a shared view of the underlying grid, e.g. to build a
    /// [`crate::grid::GridRepresentation`]
    pub fn grid(&self) -> &Grid<SnakeEntity> {
        &self.grid
    }

    /// the direction the snake will move on the next tick
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Sets the direction for the next `move_snake` call. No validation is
    /// done against reversing into the snake's own body; a reversal is
    /// allowed and will usually end the game one tick later.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// count of apples eaten so far
    pub fn score(&self) -> u32 {
        self.score
    }

    /// number of segments in the snake
    pub fn snake_len(&self) -> usize {
        self.snake.len()
    }

    /// the head segment's block id, if a snake has been added
    pub fn head(&self) -> Option<BlockId> {
        self.snake.first().map(|block| block.id)
    }

    /// the snake's segments, head first
    pub fn snake_blocks(&self) -> &[SnakeBlock] {
        &self.snake
    }

    /// the snake's cell coordinates, head first
    pub fn snake_positions(&self) -> Vec<Position> {
        self.snake
            .iter()
            .map(|block| {
                self.grid
                    .position_of(block.id)
                    .expect("snake segments are always tracked by the grid")
            })
            .collect()
    }

    /// Reads and resets the "an apple was eaten" latch. The latch is a
    /// plain boolean, so two eats between reads are indistinguishable from
    /// one; callers that care should use the [`MoveOutcome`] returned by
    /// `move_snake` instead.
    pub fn take_apple_eaten(&mut self) -> bool {
        std::mem::replace(&mut self.apple_eaten, false)
    }

    /// drains the pending render deltas from the underlying grid
    pub fn get_updates(&mut self) -> Vec<Delta<SnakeEntity>> {
        self.grid.get_updates()
    }

    /// Adds the snake's head at the given (wrap-corrected) position. Only
    /// one snake may live on a grid; a second call fails.
    pub fn add_snake(&mut self, position: Position) -> Result<(), SnakeError> {
        if !self.snake.is_empty() {
            return Err(SnakeError::SnakeAlreadyExists);
        }
        let id = self.grid.add_block(SnakeEntity::Snake, position)?;
        self.snake.push(SnakeBlock { id, body_index: 0 });
        Ok(())
    }

    /// Appends one segment to the tail. If a tail cell was vacated by the
    /// most recent `move_snake` the new segment takes that cell, so growth
    /// fills the spot the tail just left rather than poking one cell
    /// further out; otherwise the segment is placed one step beyond the
    /// current tail along the direction of travel.
    pub fn extend_snake(&mut self) -> Result<(), SnakeError> {
        let tail = match self.snake.last() {
            Some(block) => block.id,
            None => return Err(SnakeError::NoSnake),
        };

        let position = match self.last_tail_position.take() {
            Some(position) => position,
            None => {
                let tail_position = self
                    .grid
                    .position_of(tail)
                    .ok_or(GridError::BlockNotInGrid(tail))?;
                tail_position.add_vec(self.direction.to_vector())
            }
        };

        let body_index = self.snake.len() as u16;
        let id = self.grid.add_block(SnakeEntity::Snake, position)?;
        self.snake.push(SnakeBlock { id, body_index });
        Ok(())
    }

    /// Spawns an apple on a uniformly random free cell with both axes in
    /// `[1, dimension - 1)`, i.e. never touching the first or last row or
    /// column. Returns the chosen cell. Fails with `GridFull` when the
    /// spawn region has no free cell left.
    pub fn add_apple(&mut self) -> Result<Position, SnakeError> {
        self.add_apple_with_rng(&mut rand::thread_rng())
    }

    /// `add_apple` with a caller-supplied rng, for deterministic tests
    pub fn add_apple_with_rng(&mut self, rng: &mut impl Rng) -> Result<Position, SnakeError> {
        let width = self.grid.width() as i32;
        let height = self.grid.height() as i32;
        let position = self
            .grid
            .free_cells()
            .filter(|p| p.x >= 1 && p.x < width - 1 && p.y >= 1 && p.y < height - 1)
            .choose(rng)
            .ok_or(SnakeError::GridFull)?;

        self.grid.add_block(SnakeEntity::Apple, position)?;
        Ok(position)
    }

    /// spawns an apple on a specific cell
    pub fn add_apple_at(&mut self, position: Position) -> Result<(), SnakeError> {
        self.grid.add_block(SnakeEntity::Apple, position)?;
        Ok(())
    }

    /// Places an obstacle. Running the head into it is fatal, exactly like
    /// a body segment.
    pub fn add_obstacle(&mut self, position: Position) -> Result<(), SnakeError> {
        self.grid.add_block(SnakeEntity::Obstacle, position)?;
        Ok(())
    }

    /// Advances the snake one cell in the current direction.
    ///
    /// The head's new cell is its old cell minus the direction vector (the
    /// body shifts forward into vacated cells, the head alone uses the
    /// inverted delta). If the head lands on an apple, the apple is removed,
    /// the move is retried, and the tick becomes a growth tick: the tail
    /// grows back into the cell it just vacated, the score goes up by one
    /// and the apple-eaten latch is set. Landing on anything else returns
    /// [`SnakeError::Collision`], which callers should treat as the end of
    /// the game session.
    #[instrument(level = "trace", skip_all)]
    pub fn move_snake(&mut self) -> Result<MoveOutcome, SnakeError> {
        let head = match self.snake.first() {
            Some(block) => block.id,
            None => return Err(SnakeError::NoSnake),
        };
        let tail = self
            .snake
            .last()
            .map(|block| block.id)
            .unwrap_or(head);
        self.last_tail_position = self.grid.position_of(tail);

        let head_position = self
            .grid
            .position_of(head)
            .ok_or(GridError::BlockNotInGrid(head))?;
        let mut previous = head_position;
        let target = head_position.sub_vec(self.direction.to_vector());

        let mut grew = false;
        if let Err(error) = self.grid.move_block(head, target) {
            match error {
                GridError::Collision(collision)
                    if collision.existing.kind == SnakeEntity::Apple =>
                {
                    // the contested cell is clear once the apple is gone,
                    // so the retry cannot collide again
                    self.grid.remove_block(collision.existing.id);
                    self.grid.move_block(head, target)?;
                    grew = true;
                }
                GridError::Collision(collision) => {
                    return Err(SnakeError::Collision(collision))
                }
                other => return Err(other.into()),
            }
        }

        // follow the leader: each segment steps into the cell the one
        // ahead of it occupied at the start of the tick
        for segment in 1..self.snake.len() {
            let id = self.snake[segment].id;
            let current = self
                .grid
                .position_of(id)
                .ok_or(GridError::BlockNotInGrid(id))?;
            self.grid.move_block(id, previous)?;
            previous = current;
        }

        if grew {
            self.extend_snake()?;
            self.score += 1;
            self.apple_eaten = true;
            return Ok(MoveOutcome::Grew);
        }
        Ok(MoveOutcome::Moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridRepresentation;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn at(x: i32, y: i32) -> Position {
        Position { x, y }
    }

    /// a three segment snake at [(5,5), (5,4), (5,3)] heading down
    fn three_segment_fixture() -> SnakeGrid {
        let mut grid = SnakeGrid::with_direction(10, 10, Direction::Down);
        grid.add_snake(at(5, 5)).unwrap();
        grid.extend_snake().unwrap();
        grid.extend_snake().unwrap();
        grid
    }

    #[test]
    fn test_extend_regression_fixture() {
        let mut grid = SnakeGrid::with_direction(10, 12, Direction::Down);
        grid.add_snake(at(5, 5)).unwrap();
        for _ in 0..3 {
            grid.extend_snake().unwrap();
        }

        assert_eq!(
            vec![at(5, 5), at(5, 4), at(5, 3), at(5, 2)],
            grid.snake_positions()
        );
        let labels: Vec<u16> = grid.snake_blocks().iter().map(|b| b.body_index()).collect();
        assert_eq!(vec![0, 1, 2, 3], labels);
    }

    #[test]
    fn test_only_one_snake_per_grid() {
        let mut grid = SnakeGrid::new(10, 10);
        grid.add_snake(at(5, 5)).unwrap();
        assert_eq!(
            Err(SnakeError::SnakeAlreadyExists),
            grid.add_snake(at(1, 1))
        );
        assert_eq!(1, grid.snake_len());
    }

    #[test]
    fn test_operations_require_a_snake() {
        let mut grid = SnakeGrid::new(10, 10);
        assert_eq!(Err(SnakeError::NoSnake), grid.move_snake());
        assert_eq!(Err(SnakeError::NoSnake), grid.extend_snake());
    }

    #[test]
    fn test_normal_move_advances_the_head() {
        let mut grid = three_segment_fixture();
        grid.get_updates();

        assert_eq!(Ok(MoveOutcome::Moved), grid.move_snake());
        assert_eq!(
            vec![at(5, 6), at(5, 5), at(5, 4)],
            grid.snake_positions()
        );
        assert_eq!(0, grid.score());
        assert!(!grid.take_apple_eaten());
        assert_eq!(Some(grid.snake_blocks()[0].id()), grid.head());
    }

    #[test]
    fn test_direction_change_takes_effect_on_the_next_tick() {
        let mut grid = three_segment_fixture();
        grid.set_direction(Direction::Left);

        assert_eq!(Ok(MoveOutcome::Moved), grid.move_snake());
        // left's vector is (+1, 0) and the head subtracts it
        assert_eq!(at(4, 5), grid.snake_positions()[0]);
    }

    #[test]
    fn test_eating_an_apple_grows_the_snake() {
        let mut grid = three_segment_fixture();
        grid.add_apple_at(at(5, 6)).unwrap();

        assert_eq!(Ok(MoveOutcome::Grew), grid.move_snake());
        // the new tail takes the cell the old tail vacated this tick
        assert_eq!(
            vec![at(5, 6), at(5, 5), at(5, 4), at(5, 3)],
            grid.snake_positions()
        );
        assert_eq!(4, grid.snake_len());
        assert_eq!(1, grid.score());
        assert_eq!(
            SnakeEntity::Snake,
            grid.grid().occupant_at(at(5, 6)).unwrap().kind
        );

        // the latch reads true exactly once per eating event
        assert!(grid.take_apple_eaten());
        assert!(!grid.take_apple_eaten());
        assert_eq!(Ok(MoveOutcome::Moved), grid.move_snake());
        assert!(!grid.take_apple_eaten());
    }

    #[test]
    fn test_reversing_into_the_body_is_a_collision() {
        let mut grid = three_segment_fixture();
        grid.set_direction(Direction::Up);

        match grid.move_snake() {
            Err(SnakeError::Collision(collision)) => {
                assert_eq!(SnakeEntity::Snake, collision.existing.kind);
                assert_eq!(at(5, 4), collision.position);
            }
            other => panic!("expected a fatal collision, got {:?}", other),
        }
        assert_eq!(0, grid.score());
    }

    #[test]
    fn test_hitting_an_obstacle_is_a_collision() {
        let mut grid = three_segment_fixture();
        grid.add_obstacle(at(5, 6)).unwrap();

        match grid.move_snake() {
            Err(SnakeError::Collision(collision)) => {
                assert_eq!(SnakeEntity::Obstacle, collision.existing.kind);
            }
            other => panic!("expected a fatal collision, got {:?}", other),
        }
    }

    #[test]
    fn test_head_wraps_at_both_x_edges() {
        let mut grid = SnakeGrid::with_direction(10, 12, Direction::Left);
        grid.add_snake(at(0, 5)).unwrap();
        grid.move_snake().unwrap();
        assert_eq!(vec![at(9, 5)], grid.snake_positions());

        let mut grid = SnakeGrid::with_direction(10, 12, Direction::Right);
        grid.add_snake(at(9, 5)).unwrap();
        grid.move_snake().unwrap();
        assert_eq!(vec![at(0, 5)], grid.snake_positions());
    }

    #[test]
    fn test_apples_spawn_inside_the_interior_region() {
        let mut grid = SnakeGrid::new(4, 4);
        let mut rng = SmallRng::seed_from_u64(12);

        // the interior of a 4x4 grid is exactly four cells
        for _ in 0..4 {
            let position = grid.add_apple_with_rng(&mut rng).unwrap();
            assert!((1..3).contains(&position.x), "x out of region: {}", position);
            assert!((1..3).contains(&position.y), "y out of region: {}", position);
        }
        assert_eq!(Err(SnakeError::GridFull), grid.add_apple_with_rng(&mut rng));
        assert_eq!(4, grid.grid().block_count());
    }

    #[test]
    fn test_seeded_apple_spawns_are_deterministic() {
        let spawn = |seed: u64| {
            let mut grid = SnakeGrid::new(16, 16);
            let mut rng = SmallRng::seed_from_u64(seed);
            grid.add_apple_with_rng(&mut rng).unwrap()
        };
        assert_eq!(spawn(99), spawn(99));
    }

    #[test]
    fn test_representation_stays_consistent_through_an_eating_tick() {
        let mut grid = three_segment_fixture();
        grid.add_apple_at(at(5, 6)).unwrap();
        grid.get_updates();
        let mut incremental = GridRepresentation::new(grid.grid());

        grid.move_snake().unwrap();
        for delta in grid.get_updates() {
            incremental.update(&delta);
        }

        assert_eq!(GridRepresentation::new(grid.grid()), incremental);
        assert_eq!(Some(SnakeEntity::Snake), incremental.entity_at(at(5, 6)));
        assert_eq!(None, incremental.entity_at(at(5, 2)));
    }

    #[test]
    fn test_representation_renders_the_snake_glyphs() {
        let mut grid = SnakeGrid::with_direction(3, 3, Direction::Down);
        grid.add_snake(at(1, 1)).unwrap();
        grid.add_apple_at(at(2, 2)).unwrap();

        let representation = GridRepresentation::new(grid.grid());
        assert_eq!("X X X\nX S X\nX X A", representation.to_string());
    }
}
