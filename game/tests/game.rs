use collie_defence_core::{
    ConfigError, EnemyKind, Event, GameState, GridTileType, InputFrame, LevelState, Signal,
};
use collie_defence_game::Game;
use collie_defence_system_spawning::SpawnEntry;
use collie_defence_world::{carve_path, CampaignConfig, GridConfig, LevelConfig};

fn corridor(name: &str, spawns: Vec<SpawnEntry>) -> LevelConfig {
    let path = vec![[0.0, 24.0], [63.0, 24.0]];
    let mut grid = GridConfig::filled(4, 3, 16.0, GridTileType::Buildable);
    carve_path(&mut grid, &path);
    LevelConfig {
        name: name.to_owned(),
        paths: vec![path],
        grid,
        spawns,
    }
}

fn wolf_at(tick: u64) -> SpawnEntry {
    SpawnEntry {
        tick,
        enemy: EnemyKind::Wolf,
        path: 0,
    }
}

fn game(health: u32, levels: Vec<LevelConfig>) -> Game {
    let campaign = CampaignConfig {
        starting_money: 0,
        starting_health: health,
        income: None,
        levels,
    };
    Game::new(campaign.build().expect("valid campaign")).expect("game")
}

fn confirm() -> InputFrame {
    InputFrame::EMPTY.with(Signal::Confirm)
}

fn run_until_settled(game: &mut Game, events: &mut Vec<Event>) -> GameState {
    for _ in 0..10_000 {
        let state = game.tick(&InputFrame::EMPTY, events);
        if !matches!(state, GameState::Playing { .. }) {
            return state;
        }
    }
    panic!("game never left the playing state");
}

#[test]
fn confirm_on_menu_starts_first_level() {
    let mut game = game(3, vec![corridor("one", vec![wolf_at(0)])]);
    let mut events = Vec::new();

    assert_eq!(game.tick(&InputFrame::EMPTY, &mut events), GameState::Menu);
    assert_eq!(game.tick(&confirm(), &mut events), GameState::Playing { level: 0 });

    let level = game.current_level().expect("level running");
    assert_eq!(level.state(), LevelState::Active);
    assert!(game.cursor().is_some());
    assert!(events.contains(&Event::GameStateChanged {
        state: GameState::Playing { level: 0 }
    }));
}

#[test]
fn leaks_past_health_end_the_game() {
    let mut game = game(
        2,
        vec![corridor("one", vec![wolf_at(0), wolf_at(0), wolf_at(30)])],
    );
    let mut events = Vec::new();
    let _ = game.tick(&confirm(), &mut events);

    assert_eq!(run_until_settled(&mut game, &mut events), GameState::GameOver);
    assert!(game.player().is_dead());
    assert_eq!(game.level(0).map(|level| level.state()), Some(LevelState::Lost));

    assert_eq!(game.tick(&confirm(), &mut events), GameState::Menu);
    assert_eq!(game.tick(&confirm(), &mut events), GameState::Playing { level: 0 });
    assert_eq!(game.player().health(), 2, "a new run starts with a fresh player");
    assert_eq!(game.current_level().map(|level| level.enemy_count()), Some(0));
}

#[test]
fn winning_every_level_reaches_victory() {
    let mut game = game(
        10,
        vec![
            corridor("one", vec![wolf_at(0)]),
            corridor("two", vec![wolf_at(3)]),
        ],
    );
    let mut events = Vec::new();
    let _ = game.tick(&confirm(), &mut events);

    assert_eq!(run_until_settled(&mut game, &mut events), GameState::Victory);
    assert!(events.contains(&Event::GameStateChanged {
        state: GameState::Playing { level: 1 }
    }));
    assert_eq!(game.player().health(), 8);
    assert!(game.current_level().is_none());
    assert_eq!(
        game.level(0).map(|level| level.state()),
        Some(LevelState::Loading),
        "a cleared level is reset when the next one starts"
    );
    assert_eq!(game.level(1).map(|level| level.state()), Some(LevelState::Won));
}

#[test]
fn starting_a_missing_level_is_a_configuration_error() {
    let mut game = game(1, vec![corridor("one", Vec::new())]);
    let error = game
        .start_level(3, &mut Vec::new())
        .expect_err("only one level");
    assert_eq!(error, ConfigError::LevelOutOfRange { index: 3, count: 1 });
    assert_eq!(game.state(), GameState::Menu);
}
