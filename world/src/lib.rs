#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Collie Defence.
//!
//! A [`Level`] owns the grid, the waypoint paths and the live enemies, towers
//! and bullets. It is advanced once per frame by [`Level::tick`], which reads
//! a consistent snapshot of every entity before applying any removal or
//! insertion.

pub mod bullet;
pub mod config;
pub mod enemy;
pub mod grid;
pub mod level;
pub mod path;
pub mod player;
pub mod tower;

pub use bullet::{Bullet, BulletStatus, BulletTarget, Impact};
pub use config::{carve_path, Campaign, CampaignConfig, GridConfig, LevelConfig};
pub use enemy::{Enemy, EnemyStatus};
pub use grid::Grid;
pub use level::{Level, LevelBlueprint};
pub use path::WaypointPath;
pub use player::{Income, Player, PlayerSettings};
pub use tower::{FireOrder, Tower};
