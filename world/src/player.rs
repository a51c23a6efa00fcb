//! Player resources: money and health.

use collie_defence_core::{EconomyError, Event, Tick};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Passive income credited on a fixed cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    /// Money credited per payout.
    pub amount: u32,
    /// Ticks between payouts; zero disables income.
    pub interval: Tick,
}

/// Starting resources applied whenever a new player is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Money available at the start of a run.
    pub starting_money: u32,
    /// Leaks the player can absorb before dying.
    pub starting_health: u32,
    /// Optional passive income.
    #[serde(default)]
    pub income: Option<Income>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            starting_money: 100,
            starting_health: 10,
            income: None,
        }
    }
}

/// Player state mutated by the shop (spending) and the level (leaks, bounties).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    money: u32,
    health: u32,
    income: Option<Income>,
    ticks: Tick,
}

impl Player {
    /// Creates a player with the configured starting resources.
    #[must_use]
    pub fn new(settings: &PlayerSettings) -> Self {
        Self {
            money: settings.starting_money,
            health: settings.starting_health,
            income: settings.income,
            ticks: 0,
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn get_money(&self) -> u32 {
        self.money
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Whether the player can pay `amount` right now.
    #[must_use]
    pub const fn can_afford(&self, amount: u32) -> bool {
        amount <= self.money
    }

    /// Deducts `amount`, leaving the balance untouched when it is too large.
    pub fn spend_money(&mut self, amount: u32) -> Result<(), EconomyError> {
        if !self.can_afford(amount) {
            return Err(EconomyError::InsufficientFunds {
                required: amount,
                available: self.money,
            });
        }
        self.money -= amount;
        Ok(())
    }

    /// Credits `amount`.
    pub fn earn(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Removes `amount` health.
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Whether the player has run out of health.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Per-frame economy step: pays passive income when due.
    pub fn on_tick(&mut self, out: &mut Vec<Event>) {
        if self.is_dead() {
            return;
        }

        self.ticks += 1;
        let Some(income) = self.income else {
            return;
        };
        if income.interval == 0 || income.amount == 0 || self.ticks % income.interval != 0 {
            return;
        }

        self.earn(income.amount);
        debug!(money = self.money, "passive income paid");
        out.push(Event::MoneyChanged { money: self.money });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(money: u32) -> Player {
        Player::new(&PlayerSettings {
            starting_money: money,
            ..PlayerSettings::default()
        })
    }

    #[test]
    fn overspending_is_rejected_without_mutation() {
        let mut player = player(20);
        let error = player.spend_money(80).expect_err("cannot afford");
        assert_eq!(
            error,
            EconomyError::InsufficientFunds {
                required: 80,
                available: 20
            }
        );
        assert_eq!(player.get_money(), 20);
    }

    #[test]
    fn money_never_goes_negative_over_many_attempts() {
        let mut player = player(100);
        for amount in [30, 80, 50, 21, 20, 1] {
            let before = player.get_money();
            match player.spend_money(amount) {
                Ok(()) => assert_eq!(player.get_money(), before - amount),
                Err(_) => assert_eq!(player.get_money(), before),
            }
        }
        assert_eq!(player.get_money(), 0);
    }

    #[test]
    fn income_pays_on_interval() {
        let mut player = Player::new(&PlayerSettings {
            starting_money: 0,
            starting_health: 1,
            income: Some(Income {
                amount: 5,
                interval: 3,
            }),
        });
        let mut events = Vec::new();

        for _ in 0..7 {
            player.on_tick(&mut events);
        }

        assert_eq!(player.get_money(), 10);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn health_saturates_at_zero() {
        let mut player = player(0);
        player.take_damage(u32::MAX);
        assert!(player.is_dead());
        assert_eq!(player.health(), 0);
    }
}
