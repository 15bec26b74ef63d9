use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::{
    GAME_OVER_MESSAGE, GLYPH_EMPTY, GLYPH_FOOD, GLYPH_SNAKE_HEAD, GridSize, SessionConfig,
};
use crate::error::GameError;
use crate::food::{spawn_food, update_food};
use crate::input::{Direction, Key, ReversalPolicy};
use crate::port::{InputPort, RenderPort};
use crate::snake::{Position, Snake};
use crate::speed::Speed;

/// Key help written to the log panel when a session starts.
pub const HELP_LINES: [&str; 3] = [
    "Press 'q' to quit, 'r' to reset, 'p' to pause.",
    "Press 'w/s/a/d' to move the snake.",
    "Press 'z/x' to change the speed.",
];

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameState {
    Running,
    Paused,
    Over,
}

/// Whether the control loop keeps going after a key was handled.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LossCause {
    SelfCollision,
    OutOfBounds,
}

/// Returns true when the snake's head has left the interior of `surface`.
#[must_use]
pub fn out_of_bounds(snake: &Snake, surface: GridSize) -> bool {
    !snake.head().is_within_bounds(surface.interior())
}

/// Complete mutable state for one game session.
#[derive(Debug, Clone)]
pub struct Game {
    snake: Snake,
    food: Position,
    direction: Direction,
    pending_direction: Option<Direction>,
    speed: Speed,
    state: GameState,
    surface: GridSize,
    origin: Position,
    initial_speed: Speed,
    reversal: ReversalPolicy,
    rng: StdRng,
}

impl Game {
    /// Creates a session from validated parameters.
    ///
    /// Food placement is seeded from `config.seed` when present, otherwise
    /// from OS entropy.
    pub fn new(config: &SessionConfig) -> Result<Self, GameError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Creates a deterministic session for tests and reproducible runs.
    pub fn new_with_seed(config: &SessionConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &SessionConfig, mut rng: StdRng) -> Result<Self, GameError> {
        config.validate()?;

        let surface = config.surface();
        let snake = Snake::new(config.origin);
        let food = spawn_food(&mut rng, surface.interior(), &snake)?;
        let initial_speed = Speed::new(config.initial_speed);

        Ok(Self {
            snake,
            food,
            direction: Direction::Right,
            pending_direction: None,
            speed: initial_speed,
            state: GameState::Running,
            surface,
            origin: config.origin,
            initial_speed,
            reversal: config.reversal,
            rng,
        })
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[must_use]
    pub fn food(&self) -> Position {
        self.food
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Game surface dimensions, border included.
    #[must_use]
    pub fn surface(&self) -> GridSize {
        self.surface
    }

    /// Number of food items eaten since the last reset.
    #[must_use]
    pub fn food_count(&self) -> usize {
        self.snake.len() - 1
    }

    /// Input wait for the next poll: one tick while running, unbounded otherwise.
    #[must_use]
    pub fn poll_timeout(&self) -> Option<Duration> {
        match self.state {
            GameState::Running => Some(self.speed.tick_interval()),
            GameState::Paused | GameState::Over => None,
        }
    }

    /// Returns true when the snake's head has left the interior.
    #[must_use]
    pub fn out_of_bounds(&self) -> bool {
        out_of_bounds(&self.snake, self.surface)
    }

    /// Applies one poll result: a key, or `None` when the wait timed out.
    ///
    /// While running, everything except quit, pause and reset is followed by
    /// one simulation step.
    pub fn handle_key<R: RenderPort + ?Sized>(
        &mut self,
        key: Option<Key>,
        render: &mut R,
    ) -> Result<Flow, GameError> {
        if key == Some(Key::Quit) {
            info!(state = ?self.state, "quit requested");
            return Ok(Flow::Quit);
        }

        match self.state {
            GameState::Running => match key {
                Some(Key::Pause) => {
                    info!("paused");
                    self.state = GameState::Paused;
                }
                Some(Key::Reset) => self.reset(render)?,
                other => {
                    match other {
                        Some(Key::Move(direction)) => self.pending_direction = Some(direction),
                        Some(Key::SpeedUp) => self.change_speed(self.speed.faster()),
                        Some(Key::SpeedDown) => self.change_speed(self.speed.slower()),
                        _ => {}
                    }
                    self.step(render)?;
                }
            },
            GameState::Paused => match key {
                Some(Key::Pause) => {
                    info!("resumed");
                    self.state = GameState::Running;
                }
                Some(Key::Reset) => self.reset(render)?,
                _ => {}
            },
            GameState::Over => {
                if key == Some(Key::Reset) {
                    self.reset(render)?;
                }
            }
        }

        Ok(Flow::Continue)
    }

    /// Runs one simulation tick. Does nothing unless the game is running.
    pub fn step<R: RenderPort + ?Sized>(&mut self, render: &mut R) -> Result<(), GameError> {
        if self.state != GameState::Running {
            return Ok(());
        }

        if let Some(next) = self.pending_direction.take() {
            if self.reversal.permits(self.direction, next) {
                self.direction = next;
            } else {
                debug!(current = ?self.direction, rejected = ?next, "reversal ignored");
            }
        }

        render.draw_status(self.food_count(), self.speed)?;

        let food = update_food(&mut self.rng, self.food, self.surface.interior(), &self.snake)?;
        if food != self.food {
            debug!(x = food.x, y = food.y, "food placed");
            self.food = food;
        }
        render.draw_cell(self.food, GLYPH_FOOD)?;

        self.snake.advance(self.direction, self.food);

        if let Some(cause) = self.loss_cause() {
            render.draw_game_over(GAME_OVER_MESSAGE)?;
            render.append_log("Game over.")?;
            self.state = GameState::Over;
            info!(?cause, food_count = self.food_count(), "game over");
            return Ok(());
        }

        if let Some(tail) = self.snake.last_tail() {
            render.draw_cell(tail, GLYPH_EMPTY)?;
        }
        render.draw_cell(self.snake.head(), GLYPH_SNAKE_HEAD)?;

        Ok(())
    }

    /// Restores the starting snake, food, speed and direction and resumes play.
    pub fn reset<R: RenderPort + ?Sized>(&mut self, render: &mut R) -> Result<(), GameError> {
        render.clear_playfield()?;

        self.snake.reset(self.origin);
        self.food = spawn_food(&mut self.rng, self.surface.interior(), &self.snake)?;
        self.speed = self.initial_speed;
        self.direction = Direction::Right;
        self.pending_direction = None;
        self.state = GameState::Running;

        render.append_log("Game reset.")?;
        info!("game reset");
        Ok(())
    }

    fn change_speed(&mut self, speed: Speed) {
        if speed != self.speed {
            info!(from = %self.speed, to = %speed, "speed changed");
        }
        self.speed = speed;
    }

    fn loss_cause(&self) -> Option<LossCause> {
        if self.snake.self_collision() {
            Some(LossCause::SelfCollision)
        } else if self.out_of_bounds() {
            Some(LossCause::OutOfBounds)
        } else {
            None
        }
    }

    #[cfg(test)]
    fn place(&mut self, snake: Snake, food: Position) {
        self.snake = snake;
        self.food = food;
    }
}

/// Drives a session until the player quits.
///
/// Each iteration is one blocking poll (bounded by the tick interval while
/// running), one state update and one present.
pub fn run<R, I>(game: &mut Game, render: &mut R, input: &mut I) -> Result<(), GameError>
where
    R: RenderPort + ?Sized,
    I: InputPort + ?Sized,
{
    render.clear_playfield()?;
    for line in HELP_LINES {
        render.append_log(line)?;
    }
    render.present()?;

    loop {
        let key = input.poll_key(game.poll_timeout())?;
        if game.handle_key(key, render)? == Flow::Quit {
            break;
        }
        render.present()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::config::{GridSize, SessionConfig};
    use crate::input::{Direction, Key, ReversalPolicy};
    use crate::port::RenderPort;
    use crate::snake::{Position, Snake};
    use crate::speed::Speed;

    use super::{Flow, Game, GameState, out_of_bounds};

    #[derive(Debug, Default)]
    struct CountingRender {
        game_overs: usize,
        ticks: usize,
        clears: usize,
        logs: Vec<String>,
    }

    impl RenderPort for CountingRender {
        fn draw_cell(&mut self, _position: Position, _glyph: char) -> io::Result<()> {
            Ok(())
        }

        fn draw_status(&mut self, _food_count: usize, _speed: Speed) -> io::Result<()> {
            self.ticks += 1;
            Ok(())
        }

        fn draw_game_over(&mut self, _message: &str) -> io::Result<()> {
            self.game_overs += 1;
            Ok(())
        }

        fn clear_playfield(&mut self) -> io::Result<()> {
            self.clears += 1;
            Ok(())
        }

        fn append_log(&mut self, line: &str) -> io::Result<()> {
            self.logs.push(line.to_owned());
            Ok(())
        }
    }

    fn pos(x: i32, y: i32) -> Position {
        Position { x, y }
    }

    fn config(width: u16, height: u16) -> SessionConfig {
        SessionConfig {
            width,
            height,
            ..SessionConfig::default()
        }
    }

    fn game(width: u16, height: u16) -> Game {
        Game::new_with_seed(&config(width, height), 1).expect("valid config")
    }

    #[test]
    fn snake_grows_after_eating_food() {
        let mut game = game(12, 12);
        game.place(Snake::new(pos(1, 1)), pos(2, 1));
        let mut render = CountingRender::default();

        game.handle_key(None, &mut render).expect("tick");

        assert_eq!(game.snake().len(), 2);
        assert_eq!(game.food_count(), 1);
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn food_is_revalidated_every_tick() {
        let mut game = game(12, 12);
        game.place(Snake::new(pos(1, 1)), pos(2, 1));
        let mut render = CountingRender::default();

        game.handle_key(None, &mut render).expect("growth tick");
        assert_eq!(game.food(), pos(2, 1));

        game.handle_key(None, &mut render).expect("tick");
        assert_ne!(game.food(), pos(2, 1));
        assert!(!game.snake().occupies(game.food()) || game.snake().head() == game.food());
    }

    #[test]
    fn leaving_the_interior_ends_the_game() {
        let mut game = game(6, 6);
        game.place(Snake::new(pos(3, 1)), pos(0, 3));
        let mut render = CountingRender::default();

        game.handle_key(None, &mut render).expect("tick");

        assert_eq!(game.state(), GameState::Over);
        assert_eq!(render.game_overs, 1);
    }

    #[test]
    fn reversing_into_the_neck_ends_the_game_by_default() {
        let mut game = game(12, 12);
        let snake = Snake::from_segments(vec![pos(1, 1), pos(2, 1), pos(3, 1)])
            .expect("non-empty body");
        game.place(snake, pos(8, 8));
        let mut render = CountingRender::default();

        game.handle_key(Some(Key::Move(Direction::Left)), &mut render).expect("tick");

        assert_eq!(game.state(), GameState::Over);
    }

    #[test]
    fn strict_reversal_policy_keeps_heading() {
        let config = SessionConfig {
            reversal: ReversalPolicy::Reject,
            ..config(12, 12)
        };
        let mut game = Game::new_with_seed(&config, 2).expect("valid config");
        let snake = Snake::from_segments(vec![pos(1, 1), pos(2, 1), pos(3, 1)])
            .expect("non-empty body");
        game.place(snake, pos(8, 8));
        let mut render = CountingRender::default();

        game.handle_key(Some(Key::Move(Direction::Left)), &mut render).expect("tick");

        assert_eq!(game.state(), GameState::Running);
        assert_eq!(game.direction(), Direction::Right);
        assert_eq!(game.snake().head(), pos(4, 1));
    }

    #[test]
    fn speed_keys_clamp_and_still_tick() {
        let mut game = game(40, 20);
        let mut render = CountingRender::default();

        game.handle_key(Some(Key::SpeedDown), &mut render).expect("tick");
        assert_eq!(game.speed().level(), 1);
        assert_eq!(game.snake().head(), pos(1, 0));

        for _ in 0..12 {
            game.handle_key(Some(Key::SpeedUp), &mut render).expect("tick");
            game.place(Snake::new(pos(1, 1)), game.food());
        }
        assert_eq!(game.speed().level(), 10);
        assert_eq!(
            game.poll_timeout(),
            Some(std::time::Duration::from_millis(20))
        );
    }

    #[test]
    fn paused_game_ignores_movement_and_speed() {
        let mut game = game(12, 12);
        let mut render = CountingRender::default();

        game.handle_key(Some(Key::Pause), &mut render).expect("pause");
        assert_eq!(game.state(), GameState::Paused);
        assert_eq!(game.poll_timeout(), None);

        let head = game.snake().head();
        for key in [
            None,
            Some(Key::Move(Direction::Down)),
            Some(Key::SpeedUp),
            Some(Key::SpeedDown),
        ] {
            assert_eq!(
                game.handle_key(key, &mut render).expect("no-op"),
                Flow::Continue
            );
        }

        assert_eq!(game.state(), GameState::Paused);
        assert_eq!(game.snake().head(), head);
        assert_eq!(game.speed(), Speed::SLOWEST);
        assert_eq!(game.direction(), Direction::Right);

        game.handle_key(Some(Key::Pause), &mut render).expect("resume");
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn quit_ends_the_session_from_every_state() {
        let mut render = CountingRender::default();

        let mut running = game(12, 12);
        assert_eq!(
            running.handle_key(Some(Key::Quit), &mut render).expect("quit"),
            Flow::Quit
        );

        let mut paused = game(12, 12);
        paused.handle_key(Some(Key::Pause), &mut render).expect("pause");
        assert_eq!(
            paused.handle_key(Some(Key::Quit), &mut render).expect("quit"),
            Flow::Quit
        );

        let mut over = game(6, 6);
        over.place(Snake::new(pos(3, 0)), pos(0, 3));
        over.handle_key(None, &mut render).expect("tick");
        assert_eq!(over.state(), GameState::Over);
        assert_eq!(
            over.handle_key(Some(Key::Quit), &mut render).expect("quit"),
            Flow::Quit
        );
    }

    #[test]
    fn reset_after_game_over_restores_start_state() {
        let mut game = game(12, 12);
        let snake = Snake::from_segments(vec![pos(5, 5), pos(6, 5), pos(7, 5)])
            .expect("non-empty body");
        game.place(snake, pos(0, 9));
        let mut render = CountingRender::default();

        game.handle_key(Some(Key::SpeedUp), &mut render).expect("tick");
        game.handle_key(Some(Key::Move(Direction::Up)), &mut render).expect("tick");
        game.handle_key(Some(Key::Move(Direction::Down)), &mut render).expect("tick");
        assert_eq!(game.state(), GameState::Over);

        game.handle_key(Some(Key::Move(Direction::Left)), &mut render).expect("no-op");
        assert_eq!(game.state(), GameState::Over);

        game.handle_key(Some(Key::Reset), &mut render).expect("reset");

        assert_eq!(game.state(), GameState::Running);
        assert_eq!(game.snake().len(), 1);
        assert_eq!(game.snake().head(), pos(0, 0));
        assert_eq!(game.speed().level(), 1);
        assert_eq!(game.direction(), Direction::Right);
        assert!(!game.snake().occupies(game.food()));
    }

    #[test]
    fn reset_while_running_restores_start_state_without_ticking() {
        let mut game = game(12, 12);
        game.place(Snake::new(pos(1, 1)), pos(2, 1));
        let mut render = CountingRender::default();

        game.handle_key(Some(Key::SpeedUp), &mut render).expect("growth tick");
        game.handle_key(Some(Key::Move(Direction::Down)), &mut render).expect("tick");
        assert!(game.snake().len() >= 2);
        assert_eq!(game.speed().level(), 2);
        assert_eq!(game.direction(), Direction::Down);
        assert_eq!(game.state(), GameState::Running);

        let ticks = render.ticks;
        game.handle_key(Some(Key::Reset), &mut render).expect("reset");

        assert_eq!(game.state(), GameState::Running);
        assert_eq!(game.snake().len(), 1);
        assert_eq!(game.snake().head(), pos(0, 0));
        assert_eq!(game.speed(), Speed::SLOWEST);
        assert_eq!(game.direction(), Direction::Right);
        assert!(!game.snake().occupies(game.food()));
        assert_eq!(render.clears, 1);
        assert_eq!(render.logs.last().map(String::as_str), Some("Game reset."));
        assert_eq!(render.ticks, ticks, "reset must not run a tick");
    }

    #[test]
    fn out_of_bounds_accounts_for_border() {
        let surface = GridSize {
            width: 12,
            height: 12,
        };

        assert!(out_of_bounds(&Snake::new(pos(10, 4)), surface));
        assert!(!out_of_bounds(&Snake::new(pos(9, 4)), surface));
        assert!(out_of_bounds(&Snake::new(pos(-1, 4)), surface));
        assert!(out_of_bounds(&Snake::new(pos(4, 10)), surface));
        assert_eq!(game(12, 12).surface(), surface);
    }
}
