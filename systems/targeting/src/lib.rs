#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects deterministic tower targets from enemy snapshots.

use collie_defence_core::{EnemyId, EnemySnapshot, EnemyView};
use glam::Vec2;

/// Selects the enemy a tower at `origin` should engage.
///
/// Only enemies whose Euclidean distance to `origin` is at most `range` are
/// eligible. The nearest one wins; exact distance ties go to the enemy that
/// spawned first so replays stay reproducible.
#[must_use]
pub fn nearest_in_range<'a>(
    origin: Vec2,
    range: f32,
    enemies: EnemyView<'a>,
) -> Option<&'a EnemySnapshot> {
    if range < 0.0 || enemies.is_empty() {
        return None;
    }

    let max_distance_sq = range * range;
    let mut best: Option<BestCandidate<'a>> = None;

    for snapshot in enemies.iter() {
        let distance_sq = origin.distance_squared(snapshot.position);
        if distance_sq > max_distance_sq {
            continue;
        }

        let current = BestCandidate {
            distance_sq,
            snapshot,
        };

        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best.map(|candidate| candidate.snapshot)
}

/// Collects every live enemy within `radius` of `center` into `out`.
///
/// The output buffer is cleared first and filled in spawn order.
pub fn enemies_within(center: Vec2, radius: f32, enemies: EnemyView<'_>, out: &mut Vec<EnemyId>) {
    out.clear();
    if radius < 0.0 {
        return;
    }

    let radius_sq = radius * radius;
    out.extend(
        enemies
            .iter()
            .filter(|snapshot| center.distance_squared(snapshot.position) <= radius_sq)
            .map(|snapshot| snapshot.id),
    );
}

#[derive(Clone, Copy, Debug)]
struct BestCandidate<'a> {
    distance_sq: f32,
    snapshot: &'a EnemySnapshot,
}

impl BestCandidate<'_> {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.snapshot.spawn_seq < other.snapshot.spawn_seq
    }
}
