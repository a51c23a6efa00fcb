#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cursor-driven tower placement and the shop selection flow.

use collie_defence_core::{
    Event, InputSource, PlacementError, Rect, Signal, TowerId, TowerKind,
};
use collie_defence_world::{Grid, Level, Player, Tower};
use glam::Vec2;
use tracing::{debug, info};

/// Result of a shop tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShopOutcome {
    /// Still open; the highlight may have moved.
    Browsing,
    /// The highlighted tower was selected and the shop closed.
    Purchased(TowerKind),
    /// Closed without a selection.
    Closed,
}

/// Tower catalogue. Holds nothing but the in-flight selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shop {
    open: bool,
    highlighted: usize,
    purchase: Option<TowerKind>,
}

impl Shop {
    /// Creates a closed shop highlighting the first catalogue entry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            open: false,
            highlighted: 0,
            purchase: None,
        }
    }

    /// Opens the shop, discarding any previous selection.
    pub fn open(&mut self) {
        self.open = true;
        self.purchase = None;
    }

    /// Whether the shop is currently shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Tower kind under the highlight.
    #[must_use]
    pub fn highlighted(&self) -> TowerKind {
        TowerKind::ALL[self.highlighted % TowerKind::ALL.len()]
    }

    /// Last completed selection, if any.
    #[must_use]
    pub const fn get_purchase(&self) -> Option<TowerKind> {
        self.purchase
    }

    /// Hands the completed selection over to the caller.
    pub fn take_purchase(&mut self) -> Option<TowerKind> {
        self.purchase.take()
    }

    /// Reads one frame of input while the shop is open.
    pub fn on_tick(&mut self, input: &impl InputSource) -> ShopOutcome {
        if !self.open {
            return ShopOutcome::Closed;
        }

        if input.pressed(Signal::Cancel) {
            self.open = false;
            self.purchase = None;
            return ShopOutcome::Closed;
        }

        if input.pressed(Signal::Confirm) {
            let kind = self.highlighted();
            self.open = false;
            self.purchase = Some(kind);
            debug!(?kind, "shop selection made");
            return ShopOutcome::Purchased(kind);
        }

        let count = TowerKind::ALL.len();
        if input.pressed(Signal::Up) || input.pressed(Signal::Left) {
            self.highlighted = (self.highlighted + count - 1) % count;
        }
        if input.pressed(Signal::Down) || input.pressed(Signal::Right) {
            self.highlighted = (self.highlighted + 1) % count;
        }
        ShopOutcome::Browsing
    }
}

/// Placement preview for presentation layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPreview {
    /// Kind of tower pending placement.
    pub kind: TowerKind,
    /// Centre of the proposed footprint.
    pub position: Vec2,
    /// Footprint the tower would occupy.
    pub footprint: Rect,
    /// Whether the footprint is currently buildable and free.
    pub placeable: bool,
}

/// Placement cursor moving over the grid in whole-cell steps.
#[derive(Clone, Debug)]
pub struct Cursor {
    position: Vec2,
    min: Vec2,
    max: Vec2,
    step: f32,
    pending: Option<TowerKind>,
    can_build: bool,
    last_rejection: Option<PlacementError>,
    shop: Shop,
}

impl Cursor {
    /// Creates a cursor centred on the upper-left cell of `grid`.
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        let half = grid.cell_size() * 0.5;
        let bounds = grid.bounds();
        let min = bounds.min() + Vec2::splat(half);
        let max = (bounds.max() - Vec2::splat(half)).max(min);
        Self {
            position: min,
            min,
            max,
            step: grid.cell_size(),
            pending: None,
            can_build: false,
            last_rejection: None,
            shop: Shop::new(),
        }
    }

    /// Reads one frame of input and drives the shop or the placement flow.
    ///
    /// While the shop is open, cursor movement and placement are suspended.
    /// Cancel discards a pending selection, or opens the shop when nothing is
    /// pending. Confirm attempts to place the pending tower.
    pub fn on_tick(
        &mut self,
        input: &impl InputSource,
        level: &mut Level,
        player: &mut Player,
        out: &mut Vec<Event>,
    ) {
        if self.shop.is_open() {
            match self.shop.on_tick(input) {
                ShopOutcome::Purchased(_) => self.pending = self.shop.take_purchase(),
                ShopOutcome::Closed => self.pending = None,
                ShopOutcome::Browsing => {}
            }
            self.refresh(level);
            return;
        }

        if input.pressed(Signal::Cancel) {
            if self.pending.take().is_none() {
                self.shop.open();
            }
            self.refresh(level);
            return;
        }

        self.move_by(input);
        self.refresh(level);

        if input.pressed(Signal::Confirm) {
            if let Err(reason) = self.attempt_placement(level, player, out) {
                debug!(%reason, position = ?self.position, "placement rejected");
            }
        }
    }

    /// Places the pending tower at the cursor.
    ///
    /// Funds are checked first, the level then rechecks the footprint, and
    /// money is spent only once the tower is committed. A rejection leaves the
    /// level and the player untouched.
    pub fn attempt_placement(
        &mut self,
        level: &mut Level,
        player: &mut Player,
        out: &mut Vec<Event>,
    ) -> Result<TowerId, PlacementError> {
        let Some(kind) = self.pending else {
            return Err(self.reject(PlacementError::NoSelection));
        };

        let cost = kind.stats().cost;
        if !player.can_afford(cost) {
            out.push(Event::TowerPlacementRejected {
                kind,
                position: self.position,
                reason: PlacementError::InsufficientFunds,
            });
            debug!(?kind, cost, money = player.get_money(), "cannot afford tower");
            return Err(self.reject(PlacementError::InsufficientFunds));
        }

        let tower = level
            .add_tower(kind, self.position, out)
            .map_err(|reason| self.reject(reason))?;
        // Affordability was checked above and nothing was spent since.
        player
            .spend_money(cost)
            .map_err(|_| self.reject(PlacementError::InsufficientFunds))?;

        info!(?kind, position = %self.position, money = player.get_money(), "tower bought");
        out.push(Event::MoneyChanged {
            money: player.get_money(),
        });
        self.pending = None;
        self.last_rejection = None;
        self.refresh(level);
        Ok(tower)
    }

    fn reject(&mut self, reason: PlacementError) -> PlacementError {
        self.last_rejection = Some(reason);
        reason
    }

    fn move_by(&mut self, input: &impl InputSource) {
        let mut delta = Vec2::ZERO;
        if input.pressed(Signal::Left) {
            delta.x -= 1.0;
        }
        if input.pressed(Signal::Right) {
            delta.x += 1.0;
        }
        if input.pressed(Signal::Up) {
            delta.y -= 1.0;
        }
        if input.pressed(Signal::Down) {
            delta.y += 1.0;
        }
        self.position = (self.position + delta * self.step).clamp(self.min, self.max);
    }

    fn refresh(&mut self, level: &Level) {
        self.can_build = level.check_placement(self.position).is_ok();
    }

    /// Centre of the cell under the cursor.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Tower selected in the shop and not yet placed.
    #[must_use]
    pub const fn pending(&self) -> Option<TowerKind> {
        self.pending
    }

    /// Whether a tower could be built under the cursor this frame.
    #[must_use]
    pub const fn can_build(&self) -> bool {
        self.can_build
    }

    /// Reason the most recent placement attempt failed.
    #[must_use]
    pub const fn last_rejection(&self) -> Option<PlacementError> {
        self.last_rejection
    }

    /// Shop driven by this cursor.
    #[must_use]
    pub const fn shop(&self) -> &Shop {
        &self.shop
    }

    /// Footprint preview of the pending tower.
    #[must_use]
    pub fn preview(&self) -> Option<PlacementPreview> {
        self.pending.map(|kind| PlacementPreview {
            kind,
            position: self.position,
            footprint: Tower::footprint_at(self.position),
            placeable: self.can_build,
        })
    }
}
