#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that walks a level's wave timeline.

use collie_defence_core::{EnemyKind, Tick};
use serde::{Deserialize, Serialize};

/// Single entry of a spawn schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnEntry {
    /// Level tick on which the enemy enters the level.
    pub tick: Tick,
    /// Species to spawn.
    pub enemy: EnemyKind,
    /// Index of the waypoint path the enemy follows.
    #[serde(default)]
    pub path: usize,
}

/// Ordered, immutable wave timeline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnSchedule {
    entries: Vec<SpawnEntry>,
}

impl SpawnSchedule {
    /// Creates a schedule, ordering entries by tick.
    ///
    /// Entries sharing a tick keep their relative order.
    #[must_use]
    pub fn new(mut entries: Vec<SpawnEntry>) -> Self {
        entries.sort_by_key(|entry| entry.tick);
        Self { entries }
    }

    /// Entries in spawn order.
    #[must_use]
    pub fn entries(&self) -> &[SpawnEntry] {
        &self.entries
    }

    /// Number of scheduled spawns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule spawns nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cursor over a [`SpawnSchedule`] that emits due entries once per tick.
#[derive(Clone, Debug, Default)]
pub struct Spawning {
    cursor: usize,
}

impl Spawning {
    /// Creates a spawning system positioned at the start of a schedule.
    #[must_use]
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Emits every entry due at or before `tick` that has not been emitted yet.
    ///
    /// The output buffer is cleared before populating it.
    pub fn handle(&mut self, schedule: &SpawnSchedule, tick: Tick, out: &mut Vec<SpawnEntry>) {
        out.clear();

        while let Some(entry) = schedule.entries.get(self.cursor) {
            if entry.tick > tick {
                break;
            }
            out.push(*entry);
            self.cursor += 1;
        }
    }

    /// Reports whether every entry of `schedule` has been emitted.
    #[must_use]
    pub fn is_exhausted(&self, schedule: &SpawnSchedule) -> bool {
        self.cursor >= schedule.len()
    }

    /// Number of entries still waiting to be emitted.
    #[must_use]
    pub fn remaining(&self, schedule: &SpawnSchedule) -> usize {
        schedule.len().saturating_sub(self.cursor)
    }

    /// Rewinds to the start of the schedule.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tick: Tick, enemy: EnemyKind) -> SpawnEntry {
        SpawnEntry {
            tick,
            enemy,
            path: 0,
        }
    }

    #[test]
    fn emits_entries_when_their_tick_arrives() {
        let schedule = SpawnSchedule::new(vec![
            entry(5, EnemyKind::Wolf),
            entry(1, EnemyKind::Tiger),
            entry(5, EnemyKind::Boar),
        ]);
        let mut spawning = Spawning::new();
        let mut out = Vec::new();

        spawning.handle(&schedule, 0, &mut out);
        assert!(out.is_empty());

        spawning.handle(&schedule, 1, &mut out);
        assert_eq!(out, vec![entry(1, EnemyKind::Tiger)]);

        spawning.handle(&schedule, 4, &mut out);
        assert!(out.is_empty(), "buffer must be cleared between ticks");

        spawning.handle(&schedule, 5, &mut out);
        assert_eq!(
            out,
            vec![entry(5, EnemyKind::Wolf), entry(5, EnemyKind::Boar)],
            "same-tick entries keep their declaration order"
        );
        assert!(spawning.is_exhausted(&schedule));
    }

    #[test]
    fn skipped_ticks_release_every_overdue_entry() {
        let schedule = SpawnSchedule::new(vec![entry(2, EnemyKind::Tiger), entry(3, EnemyKind::Tiger)]);
        let mut spawning = Spawning::new();
        let mut out = Vec::new();

        spawning.handle(&schedule, 10, &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(spawning.remaining(&schedule), 0);
    }

    #[test]
    fn reset_rewinds_to_first_entry() {
        let schedule = SpawnSchedule::new(vec![entry(1, EnemyKind::Tiger)]);
        let mut spawning = Spawning::new();
        let mut out = Vec::new();

        spawning.handle(&schedule, 1, &mut out);
        assert!(spawning.is_exhausted(&schedule));

        spawning.reset();
        assert_eq!(spawning.remaining(&schedule), 1);
    }

    #[test]
    fn empty_schedule_is_exhausted_immediately() {
        let schedule = SpawnSchedule::default();
        assert!(Spawning::new().is_exhausted(&schedule));
    }
}
