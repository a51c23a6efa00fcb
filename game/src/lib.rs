#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Top-level game flow: launch menu, level sequence, game over and victory.

use collie_defence_core::{Camera, ConfigError, Event, GameState, InputSource, Signal};
use collie_defence_system_placement::Cursor;
use collie_defence_world::{Campaign, Level, Player, PlayerSettings};
use tracing::{info, warn};

/// Launch screen shown before a run starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Menu;

impl Menu {
    /// Returns `true` while the menu should stay on screen.
    #[must_use]
    pub fn on_tick(&mut self, input: &impl InputSource) -> bool {
        !input.pressed(Signal::Confirm)
    }
}

/// Game state machine owning the player, the campaign levels and the cursor.
#[derive(Debug)]
pub struct Game {
    settings: PlayerSettings,
    levels: Vec<Level>,
    camera: Camera,
    menu: Menu,
    state: GameState,
    player: Player,
    cursor: Option<Cursor>,
}

impl Game {
    /// Creates a game sitting on the launch menu.
    pub fn new(campaign: Campaign) -> Result<Self, ConfigError> {
        if campaign.levels.is_empty() {
            return Err(ConfigError::EmptyCampaign);
        }

        Ok(Self {
            settings: campaign.player,
            levels: campaign.levels.into_iter().map(Level::new).collect(),
            camera: Camera::default(),
            menu: Menu,
            state: GameState::Menu,
            player: Player::new(&campaign.player),
            cursor: None,
        })
    }

    /// Advances the game by one frame and returns the resulting state.
    pub fn tick(&mut self, input: &impl InputSource, out: &mut Vec<Event>) -> GameState {
        match self.state {
            GameState::Menu => {
                if !self.menu.on_tick(input) {
                    self.player = Player::new(&self.settings);
                    self.start_or_abort(0, out);
                }
            }
            GameState::Playing { level } => self.play(level, input, out),
            GameState::GameOver | GameState::Victory => {
                if input.pressed(Signal::Confirm) {
                    self.transition(GameState::Menu, out);
                }
            }
        }
        self.state
    }

    /// Starts the level at `index`, resetting whatever it left behind.
    pub fn start_level(&mut self, index: usize, out: &mut Vec<Event>) -> Result<(), ConfigError> {
        let count = self.levels.len();
        let level = self
            .levels
            .get_mut(index)
            .ok_or(ConfigError::LevelOutOfRange { index, count })?;

        level.init(self.camera, out);
        self.cursor = Some(Cursor::new(level.grid()));
        info!(index, name = level.name(), "loading level");
        self.transition(GameState::Playing { level: index }, out);
        Ok(())
    }

    fn start_or_abort(&mut self, index: usize, out: &mut Vec<Event>) {
        if let Err(error) = self.start_level(index, out) {
            warn!(%error, "cannot start level");
            self.cursor = None;
            self.transition(GameState::Menu, out);
        }
    }

    fn play(&mut self, index: usize, input: &impl InputSource, out: &mut Vec<Event>) {
        if index >= self.levels.len() {
            self.start_or_abort(index, out);
            return;
        }
        let level_count = self.levels.len();
        let level = &mut self.levels[index];

        if let Some(cursor) = self.cursor.as_mut() {
            cursor.on_tick(input, level, &mut self.player, out);
        }
        level.tick(&mut self.player, out);
        self.player.on_tick(out);

        if self.player.is_dead() {
            level.fail(out);
            info!(index, "game over");
            self.cursor = None;
            self.transition(GameState::GameOver, out);
        } else if level.is_won() {
            let next = index + 1;
            if next < level_count {
                level.reset();
                self.start_or_abort(next, out);
            } else {
                info!("campaign complete");
                self.cursor = None;
                self.transition(GameState::Victory, out);
            }
        }
    }

    fn transition(&mut self, state: GameState, out: &mut Vec<Event>) {
        if self.state == state {
            return;
        }
        self.state = state;
        info!(?state, "game state changed");
        out.push(Event::GameStateChanged { state });
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Player of the current run.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Level being played, if any.
    #[must_use]
    pub fn current_level(&self) -> Option<&Level> {
        match self.state {
            GameState::Playing { level } => self.levels.get(level),
            _ => None,
        }
    }

    /// Level at campaign position `index`.
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Number of levels in the campaign.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Placement cursor of the running level.
    #[must_use]
    pub const fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }
}
