use rand::Rng;

use crate::config::{Palette, PoisonConfig, PoisonRespawn, Rgb};
use crate::geometry::GridPosition;

/// Timer phase of a poison apple.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PoisonPhase {
    /// Hidden until the logical clock reaches `activates_at_ms`.
    Dormant { activates_at_ms: u64 },
    /// Visible and edible until the logical clock reaches `expires_at_ms`.
    Active { expires_at_ms: u64 },
}

/// Food type and associated metadata.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FoodKind {
    Apple,
    Orange,
    Poison(PoisonPhase),
}

/// Result of advancing a food timer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TimerEvent {
    Idle,
    /// The food just became active and needs a fresh position.
    Activated,
    Expired,
}

/// Food entity on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Food {
    pub position: GridPosition,
    pub kind: FoodKind,
}

impl Food {
    #[must_use]
    pub fn apple(position: GridPosition) -> Self {
        Self {
            position,
            kind: FoodKind::Apple,
        }
    }

    #[must_use]
    pub fn orange(position: GridPosition) -> Self {
        Self {
            position,
            kind: FoodKind::Orange,
        }
    }

    /// Creates a dormant poison apple that wakes after the first configured delay.
    #[must_use]
    pub fn poison<R: Rng + ?Sized>(
        position: GridPosition,
        now_ms: u64,
        timing: &PoisonConfig,
        rng: &mut R,
    ) -> Self {
        Self {
            position,
            kind: FoodKind::Poison(PoisonPhase::Dormant {
                activates_at_ms: now_ms
                    .saturating_add(rng.gen_range(timing.first_delay_ms.as_range())),
            }),
        }
    }

    /// Returns true when the food is visible and can be eaten.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.kind, FoodKind::Poison(PoisonPhase::Dormant { .. }))
    }

    /// Returns true when a head at `head` would eat this food.
    #[must_use]
    pub fn is_eaten_by(&self, head: GridPosition) -> bool {
        self.is_active() && self.position == head
    }

    /// Occupancy used when spawning other entities; dormant poison never blocks.
    #[must_use]
    pub fn blocks(&self, position: GridPosition) -> bool {
        self.is_active() && self.position == position
    }

    /// Advances the poison timer to `now_ms`. Apples and oranges never change.
    pub fn advance_timer<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        timing: &PoisonConfig,
        rng: &mut R,
    ) -> TimerEvent {
        let FoodKind::Poison(phase) = &mut self.kind else {
            return TimerEvent::Idle;
        };

        match *phase {
            PoisonPhase::Dormant { activates_at_ms } if now_ms >= activates_at_ms => {
                *phase = PoisonPhase::Active {
                    expires_at_ms: now_ms
                        .saturating_add(rng.gen_range(timing.active_ms.as_range())),
                };
                TimerEvent::Activated
            }
            PoisonPhase::Active { expires_at_ms } if now_ms >= expires_at_ms => {
                *phase = PoisonPhase::Dormant {
                    activates_at_ms: now_ms
                        .saturating_add(rng.gen_range(timing.respawn_delay_ms.as_range())),
                };
                TimerEvent::Expired
            }
            _ => TimerEvent::Idle,
        }
    }

    /// Applies the after-consumption policy to a poison apple.
    ///
    /// Returns true when the food stays active and must be moved elsewhere.
    pub fn consume_poison<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        timing: &PoisonConfig,
        rng: &mut R,
    ) -> bool {
        let FoodKind::Poison(phase) = &mut self.kind else {
            return false;
        };

        match timing.after_consumption {
            PoisonRespawn::Reactivate => {
                *phase = PoisonPhase::Active {
                    expires_at_ms: now_ms
                        .saturating_add(rng.gen_range(timing.active_ms.as_range())),
                };
                true
            }
            PoisonRespawn::Dormant => {
                *phase = PoisonPhase::Dormant {
                    activates_at_ms: now_ms
                        .saturating_add(rng.gen_range(timing.respawn_delay_ms.as_range())),
                };
                false
            }
        }
    }

    #[must_use]
    pub fn color(&self, palette: &Palette) -> Rgb {
        match self.kind {
            FoodKind::Apple => palette.apple,
            FoodKind::Orange => palette.orange,
            FoodKind::Poison(_) => palette.poison,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{Food, FoodKind, PoisonPhase, TimerEvent};
    use crate::config::{MsRange, PoisonConfig, PoisonRespawn};
    use crate::geometry::GridPosition;

    fn timing() -> PoisonConfig {
        PoisonConfig {
            enabled: true,
            first_delay_ms: MsRange::new(1_000, 1_000),
            active_ms: MsRange::new(500, 500),
            respawn_delay_ms: MsRange::new(2_000, 2_000),
            after_consumption: PoisonRespawn::Dormant,
        }
    }

    #[test]
    fn poison_cycles_dormant_active_dormant() {
        let mut rng = StdRng::seed_from_u64(1);
        let timing = timing();
        let mut poison = Food::poison(GridPosition::new(1, 1), 0, &timing, &mut rng);

        assert!(!poison.is_active());
        assert_eq!(poison.advance_timer(999, &timing, &mut rng), TimerEvent::Idle);
        assert_eq!(
            poison.advance_timer(1_000, &timing, &mut rng),
            TimerEvent::Activated
        );
        assert!(poison.is_active());
        assert_eq!(poison.advance_timer(1_499, &timing, &mut rng), TimerEvent::Idle);
        assert_eq!(
            poison.advance_timer(1_500, &timing, &mut rng),
            TimerEvent::Expired
        );
        assert_eq!(
            poison.kind,
            FoodKind::Poison(PoisonPhase::Dormant {
                activates_at_ms: 3_500
            })
        );
    }

    #[test]
    fn dormant_poison_cannot_be_eaten() {
        let mut rng = StdRng::seed_from_u64(2);
        let cell = GridPosition::new(2, 2);
        let poison = Food::poison(cell, 0, &timing(), &mut rng);

        assert!(!poison.is_eaten_by(cell));
        assert!(!poison.blocks(cell));
    }

    #[test]
    fn consume_policy_controls_reactivation() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut timing = timing();
        let mut poison = Food::poison(GridPosition::new(0, 0), 0, &timing, &mut rng);

        assert!(!poison.consume_poison(10, &timing, &mut rng));
        assert!(!poison.is_active());

        timing.after_consumption = PoisonRespawn::Reactivate;
        assert!(poison.consume_poison(10, &timing, &mut rng));
        assert!(poison.is_active());
    }

    #[test]
    fn huge_delays_saturate_instead_of_overflowing() {
        let mut rng = StdRng::seed_from_u64(5);
        let timing = PoisonConfig {
            first_delay_ms: MsRange::new(u64::MAX - 10, u64::MAX),
            active_ms: MsRange::new(u64::MAX - 10, u64::MAX),
            respawn_delay_ms: MsRange::new(u64::MAX - 10, u64::MAX),
            ..timing()
        };

        let mut poison = Food::poison(GridPosition::new(0, 0), 1_000, &timing, &mut rng);
        assert_eq!(
            poison.kind,
            FoodKind::Poison(PoisonPhase::Dormant {
                activates_at_ms: u64::MAX
            })
        );

        assert_eq!(
            poison.advance_timer(u64::MAX, &timing, &mut rng),
            TimerEvent::Activated
        );
        assert!(!poison.consume_poison(u64::MAX, &timing, &mut rng));
        assert_eq!(
            poison.kind,
            FoodKind::Poison(PoisonPhase::Dormant {
                activates_at_ms: u64::MAX
            })
        );
    }

    #[test]
    fn apples_and_oranges_are_always_active() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut apple = Food::apple(GridPosition::new(1, 2));
        let orange = Food::orange(GridPosition::new(2, 1));

        assert!(apple.is_eaten_by(GridPosition::new(1, 2)));
        assert!(orange.is_active());
        assert_eq!(
            apple.advance_timer(u64::MAX, &timing(), &mut rng),
            TimerEvent::Idle
        );
    }
}
