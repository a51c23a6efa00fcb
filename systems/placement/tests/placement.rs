use collie_defence_core::{
    Camera, Event, GridTileType, InputFrame, PlacementError, Signal, TowerKind,
};
use collie_defence_system_placement::Cursor;
use collie_defence_world::{
    carve_path, GridConfig, Level, LevelConfig, Player, PlayerSettings,
};
use glam::Vec2;

// 8x3 grid of 16-unit cells, middle row carved as path.
fn active_level() -> Level {
    let path = vec![[0.0, 24.0], [127.0, 24.0]];
    let mut grid = GridConfig::filled(8, 3, 16.0, GridTileType::Buildable);
    carve_path(&mut grid, &path);
    let config = LevelConfig {
        name: "placement".to_owned(),
        paths: vec![path],
        grid,
        spawns: Vec::new(),
    };
    let mut level = Level::new(config.build().expect("valid level"));
    level.init(Camera::default(), &mut Vec::new());
    level
}

fn player(money: u32) -> Player {
    Player::new(&PlayerSettings {
        starting_money: money,
        ..PlayerSettings::default()
    })
}

struct Session {
    level: Level,
    player: Player,
    cursor: Cursor,
    events: Vec<Event>,
}

impl Session {
    fn new(money: u32) -> Self {
        let level = active_level();
        let cursor = Cursor::new(level.grid());
        Self {
            level,
            player: player(money),
            cursor,
            events: Vec::new(),
        }
    }

    fn press(&mut self, signal: Signal) {
        self.cursor.on_tick(
            &InputFrame::EMPTY.with(signal),
            &mut self.level,
            &mut self.player,
            &mut self.events,
        );
    }

    fn buy_basic(&mut self) {
        self.press(Signal::Cancel);
        assert!(self.cursor.shop().is_open(), "cancel with nothing pending opens the shop");
        self.press(Signal::Confirm);
        assert_eq!(self.cursor.pending(), Some(TowerKind::Basic));
    }
}

#[test]
fn second_purchase_fails_when_funds_run_out() {
    let mut session = Session::new(100);

    session.buy_basic();
    session.press(Signal::Confirm);
    assert_eq!(session.player.get_money(), 20);
    assert_eq!(session.level.get_towers().count(), 1);
    assert_eq!(session.cursor.pending(), None);

    session.press(Signal::Right);
    session.press(Signal::Right);
    session.buy_basic();
    assert!(session.cursor.can_build());
    session.press(Signal::Confirm);

    assert_eq!(session.player.get_money(), 20, "rejected placement must not spend");
    assert_eq!(session.level.get_towers().count(), 1);
    assert_eq!(
        session.cursor.last_rejection(),
        Some(PlacementError::InsufficientFunds)
    );
    assert_eq!(session.cursor.pending(), Some(TowerKind::Basic));
}

#[test]
fn placing_on_path_never_mutates_state() {
    let mut session = Session::new(500);
    session.press(Signal::Down);
    assert_eq!(session.cursor.position(), Vec2::new(8.0, 24.0));
    assert!(!session.cursor.can_build());

    session.buy_basic();
    session.press(Signal::Confirm);

    assert_eq!(session.player.get_money(), 500);
    assert_eq!(session.level.get_towers().count(), 0);
    assert_eq!(
        session.cursor.last_rejection(),
        Some(PlacementError::NotBuildable)
    );
    assert!(session.events.iter().any(|event| matches!(
        event,
        Event::TowerPlacementRejected {
            reason: PlacementError::NotBuildable,
            ..
        }
    )));
}

#[test]
fn overlapping_placement_is_rejected() {
    let mut session = Session::new(500);
    session.buy_basic();
    session.press(Signal::Confirm);
    assert!(!session.cursor.can_build(), "cell is now occupied");

    session.buy_basic();
    session.press(Signal::Confirm);

    assert_eq!(
        session.cursor.last_rejection(),
        Some(PlacementError::Overlapping)
    );
    assert_eq!(session.player.get_money(), 420);
    assert_eq!(session.level.get_towers().count(), 1);
}

#[test]
fn cursor_stays_inside_the_grid() {
    let mut session = Session::new(0);
    session.press(Signal::Up);
    session.press(Signal::Left);
    assert_eq!(session.cursor.position(), Vec2::new(8.0, 8.0));

    for _ in 0..20 {
        session.press(Signal::Right);
        session.press(Signal::Down);
    }
    assert_eq!(session.cursor.position(), Vec2::new(120.0, 40.0));
}

#[test]
fn shop_suspends_movement_and_cancel_drops_selection() {
    let mut session = Session::new(100);
    session.press(Signal::Cancel);
    session.press(Signal::Right);
    assert_eq!(session.cursor.position(), Vec2::new(8.0, 8.0));
    assert_eq!(session.cursor.shop().highlighted(), TowerKind::Area);

    session.press(Signal::Confirm);
    assert_eq!(session.cursor.pending(), Some(TowerKind::Area));

    session.press(Signal::Cancel);
    assert_eq!(session.cursor.pending(), None);
    assert!(!session.cursor.shop().is_open());
    assert!(session.cursor.preview().is_none());

    session.press(Signal::Confirm);
    assert_eq!(
        session.cursor.last_rejection(),
        Some(PlacementError::NoSelection)
    );
}
