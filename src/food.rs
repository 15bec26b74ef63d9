use rand::Rng;

use crate::config::GridSize;
use crate::error::GameError;
use crate::snake::{Position, Snake};

/// Random draws allowed per interior cell before falling back to a scan.
const SAMPLING_ATTEMPTS_PER_CELL: usize = 4;

/// Returns true when `food` sits inside the interior and off the snake.
#[must_use]
pub fn is_food_valid(food: Position, interior: GridSize, snake: &Snake) -> bool {
    food.is_within_bounds(interior) && !snake.occupies(food)
}

/// Keeps `food` if it is still valid, otherwise picks a new free cell.
pub fn update_food<R: Rng + ?Sized>(
    rng: &mut R,
    food: Position,
    interior: GridSize,
    snake: &Snake,
) -> Result<Position, GameError> {
    if is_food_valid(food, interior, snake) {
        return Ok(food);
    }

    spawn_food(rng, interior, snake)
}

/// Draws a new food cell that the snake does not occupy.
///
/// Cells are drawn uniformly from the interior and rejected while they land
/// on the snake. Returns [`GameError::FoodStarvation`] when the snake leaves
/// no room.
pub fn spawn_food<R: Rng + ?Sized>(
    rng: &mut R,
    interior: GridSize,
    snake: &Snake,
) -> Result<Position, GameError> {
    let interior_cells = interior.total_cells();
    if interior_cells <= snake.len() {
        return Err(GameError::FoodStarvation {
            interior_cells,
            snake_len: snake.len(),
        });
    }

    for _ in 0..interior_cells.saturating_mul(SAMPLING_ATTEMPTS_PER_CELL) {
        let candidate = random_cell(rng, interior);
        if !snake.occupies(candidate) {
            return Ok(candidate);
        }
    }

    tracing::debug!(
        snake_len = snake.len(),
        interior_cells,
        "rejection sampling exhausted, scanning for free cells"
    );
    spawn_position(rng, interior, snake).ok_or(GameError::FoodStarvation {
        interior_cells,
        snake_len: snake.len(),
    })
}

/// Picks a uniformly random free cell by enumerating the whole interior.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    interior: GridSize,
    snake: &Snake,
) -> Option<Position> {
    let mut candidates = Vec::new();

    for y in 0..i32::from(interior.height) {
        for x in 0..i32::from(interior.width) {
            let position = Position { x, y };
            if !snake.occupies(position) {
                candidates.push(position);
            }
        }
    }

    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R, interior: GridSize) -> Position {
    Position {
        x: rng.gen_range(0..i32::from(interior.width)),
        y: rng.gen_range(0..i32::from(interior.height)),
    }
}
