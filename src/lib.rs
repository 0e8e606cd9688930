#![deny(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs
)]
//! State core for a grid based snake game: a 2d occupancy grid that tracks
//! positioned entities (snake segments, apples, obstacles), detects
//! collisions, and emits incremental change deltas for rendering.
//!
//! The [`grid`] module knows nothing about snakes; it is a generic occupancy
//! store with toroidal wrap and a drainable change log. The [`snake`] module
//! composes those primitives into the actual game rules: one snake, apples
//! that grow it, obstacles that end it. Rendering, input mapping and frame
//! pacing live outside this crate and talk to it through
//! [`snake::SnakeGrid::set_direction`], [`snake::SnakeGrid::move_snake`] and
//! [`snake::SnakeGrid::get_updates`].
//!
//! ```
//! use snake_grid_types::snake::SnakeGrid;
//! use snake_grid_types::types::{Direction, Position};
//!
//! let mut game = SnakeGrid::new(32, 18);
//! game.add_snake(Position { x: 16, y: 9 }).unwrap();
//! for _ in 0..3 {
//!     game.extend_snake().unwrap();
//! }
//! game.set_direction(Direction::Down);
//! game.move_snake().unwrap();
//! for delta in game.get_updates() {
//!     // hand each changed cell to the renderer, in order
//!     let _ = delta;
//! }
//! ```

pub mod grid;
pub mod snake;
pub mod types;
