//! The stress meter: a bounded value with a danger zone and a sticky
//! exhausted state.
//!
//! All mutation goes through [`StressMeter::increase`],
//! [`StressMeter::decrease`] and [`StressMeter::reset`]. Every accepted
//! mutation keeps `0 <= current <= max` and publishes its notifications in
//! a fixed order: value change, then zone edge, then exhaustion.

mod shared;

pub use shared::*;

use serde::{Deserialize, Serialize};
use std::sync::mpsc;

use crate::config::{MeterConfig, MeterConfigError};
use crate::events::{StressEvent, SubscriptionId, Subscribers};

/// Why a mutation request was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// The meter is exhausted; only a reset can change it now.
    Terminal,
    /// The amount was negative, NaN or infinite.
    InvalidAmount,
}

/// Result of an `increase` or `decrease` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeltaOutcome {
    /// The value moved.
    Applied { previous: f32, current: f32 },
    /// Accepted, but clamping left the value where it was.
    Unchanged,
    /// Dropped without touching state or notifying anyone.
    Ignored(IgnoreReason),
}

impl DeltaOutcome {
    /// Check if the value actually moved.
    pub fn is_applied(&self) -> bool {
        matches!(self, DeltaOutcome::Applied { .. })
    }
}

/// Read-only view of the meter at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterSnapshot {
    pub current: f32,
    pub max: f32,
    pub danger_threshold: f32,
    pub in_danger_zone: bool,
    pub exhausted: bool,
}

/// Bounded stress accumulator.
#[derive(Debug)]
pub struct StressMeter {
    config: MeterConfig,
    current: f32,
    /// Zone state as last reported to subscribers.
    zone_latch: bool,
    exhausted: bool,
    subscribers: Subscribers<StressEvent>,
}

impl StressMeter {
    /// Create a meter at its starting value.
    pub fn new(config: MeterConfig) -> Result<Self, MeterConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            current: config.starting_stress,
            zone_latch: false,
            exhausted: false,
            subscribers: Subscribers::new(),
        })
    }

    /// Create a meter with the default 0..100 range and threshold 80.
    pub fn with_defaults() -> Self {
        let config = MeterConfig::default();
        Self {
            config,
            current: config.starting_stress,
            zone_latch: false,
            exhausted: false,
            subscribers: Subscribers::new(),
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.config.max_stress
    }

    pub fn danger_threshold(&self) -> f32 {
        self.config.danger_threshold
    }

    pub fn starting_stress(&self) -> f32 {
        self.config.starting_stress
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Check if the meter has latched at its maximum.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Check if the value is at or above the danger threshold.
    ///
    /// This is the level, not the last reported edge: a meter that starts
    /// inside the zone is in it before any `ZoneEntered` has fired.
    pub fn in_danger_zone(&self) -> bool {
        self.current >= self.config.danger_threshold
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            current: self.current,
            max: self.config.max_stress,
            danger_threshold: self.config.danger_threshold,
            in_danger_zone: self.in_danger_zone(),
            exhausted: self.exhausted,
        }
    }

    /// Add stress. Reaching the maximum exhausts the meter.
    pub fn increase(&mut self, amount: f32) -> DeltaOutcome {
        if let Some(reason) = self.reject(amount, "increase") {
            return DeltaOutcome::Ignored(reason);
        }

        let outcome = self.move_to(self.current + amount);
        tracing::debug!(
            "Stress {:.0}/{:.0} (+{:.1})",
            self.current,
            self.config.max_stress,
            amount
        );

        // Checked even when clamping left the value unchanged, so a meter
        // that starts at max latches on its first increase.
        if self.current >= self.config.max_stress {
            self.exhaust();
        }
        outcome
    }

    /// Remove stress. Never exhausts the meter.
    pub fn decrease(&mut self, amount: f32) -> DeltaOutcome {
        if let Some(reason) = self.reject(amount, "decrease") {
            return DeltaOutcome::Ignored(reason);
        }

        let outcome = self.move_to(self.current - amount);
        tracing::debug!(
            "Stress {:.0}/{:.0} (-{:.1})",
            self.current,
            self.config.max_stress,
            amount
        );
        outcome
    }

    /// Reload the starting state, even from exhaustion.
    ///
    /// The zone latch is cleared silently; only `ValueChanged` is published.
    pub fn reset(&mut self) {
        self.current = self.config.starting_stress;
        self.exhausted = false;
        self.zone_latch = false;
        self.subscribers
            .publish(&StressEvent::ValueChanged(self.current));
        tracing::info!("Stress reset to {:.0}", self.current);
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&StressEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn subscribe_channel(&mut self) -> (SubscriptionId, mpsc::Receiver<StressEvent>) {
        self.subscribers.subscribe_channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn reject(&self, amount: f32, op: &str) -> Option<IgnoreReason> {
        if self.exhausted {
            tracing::debug!("Ignoring {} of {}: meter exhausted", op, amount);
            return Some(IgnoreReason::Terminal);
        }
        if !amount.is_finite() || amount < 0.0 {
            tracing::warn!("Rejecting {} with invalid amount {}", op, amount);
            return Some(IgnoreReason::InvalidAmount);
        }
        None
    }

    fn move_to(&mut self, target: f32) -> DeltaOutcome {
        let previous = self.current;
        let clamped = target.clamp(0.0, self.config.max_stress);
        if clamped == previous {
            return DeltaOutcome::Unchanged;
        }

        self.current = clamped;
        self.subscribers
            .publish(&StressEvent::ValueChanged(self.current));
        self.update_zone();

        DeltaOutcome::Applied {
            previous,
            current: self.current,
        }
    }

    fn update_zone(&mut self) {
        let in_zone = self.current >= self.config.danger_threshold;
        if in_zone == self.zone_latch {
            return;
        }

        self.zone_latch = in_zone;
        if in_zone {
            tracing::info!("Entered danger zone at {:.0}", self.current);
            self.subscribers.publish(&StressEvent::ZoneEntered);
        } else {
            tracing::info!("Left danger zone at {:.0}", self.current);
            self.subscribers.publish(&StressEvent::ZoneExited);
        }
    }

    fn exhaust(&mut self) {
        if self.exhausted {
            return;
        }
        self.exhausted = true;
        tracing::warn!("Stress reached maximum {:.0}, meter exhausted", self.current);
        self.subscribers.publish(&StressEvent::Exhausted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter_at(start: f32) -> StressMeter {
        StressMeter::new(MeterConfig {
            starting_stress: start,
            max_stress: 100.0,
            danger_threshold: 80.0,
        })
        .unwrap()
    }

    fn drain(rx: &mpsc::Receiver<StressEvent>) -> Vec<StressEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_new_meter() {
        let meter = meter_at(10.0);
        assert_eq!(meter.current(), 10.0);
        assert_eq!(meter.max(), 100.0);
        assert_eq!(meter.danger_threshold(), 80.0);
        assert!(!meter.is_exhausted());
        assert!(!meter.in_danger_zone());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MeterConfig {
            danger_threshold: 150.0,
            ..Default::default()
        };
        assert!(StressMeter::new(config).is_err());
    }

    #[test]
    fn test_value_stays_in_bounds() {
        let mut meter = meter_at(0.0);
        let steps: [(bool, f32); 8] = [
            (true, 30.0),
            (false, 70.0),
            (true, 55.5),
            (false, 0.5),
            (true, 44.0),
            (false, 1000.0),
            (true, 99.9),
            (true, 250.0),
        ];

        for (up, amount) in steps {
            if up {
                meter.increase(amount);
            } else {
                meter.decrease(amount);
            }
            assert!(meter.current() >= 0.0);
            assert!(meter.current() <= meter.max());
        }
        assert_eq!(meter.current(), 100.0);
    }

    #[test]
    fn test_decrease_clamps_to_zero() {
        let mut meter = meter_at(5.0);
        let outcome = meter.decrease(20.0);
        assert_eq!(
            outcome,
            DeltaOutcome::Applied {
                previous: 5.0,
                current: 0.0
            }
        );
        assert_eq!(meter.decrease(1.0), DeltaOutcome::Unchanged);
    }

    #[test]
    fn test_unchanged_value_publishes_nothing() {
        let mut meter = meter_at(0.0);
        let (_, rx) = meter.subscribe_channel();

        assert_eq!(meter.decrease(10.0), DeltaOutcome::Unchanged);
        assert_eq!(meter.increase(0.0), DeltaOutcome::Unchanged);
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_zone_entered_once_per_crossing() {
        let mut meter = meter_at(0.0);
        let (_, rx) = meter.subscribe_channel();

        meter.increase(80.0);
        meter.increase(5.0);
        meter.increase(5.0);

        let events = drain(&rx);
        let entered = events
            .iter()
            .filter(|e| **e == StressEvent::ZoneEntered)
            .count();
        assert_eq!(entered, 1);
        assert_eq!(
            events,
            vec![
                StressEvent::ValueChanged(80.0),
                StressEvent::ZoneEntered,
                StressEvent::ValueChanged(85.0),
                StressEvent::ValueChanged(90.0),
            ]
        );
        assert!(meter.in_danger_zone());
    }

    #[test]
    fn test_zone_exit_and_reenter() {
        let mut meter = meter_at(70.0);
        let (_, rx) = meter.subscribe_channel();

        meter.increase(15.0);
        meter.decrease(10.0);
        meter.decrease(1.0);
        meter.increase(20.0);

        let edges: Vec<_> = drain(&rx)
            .into_iter()
            .filter(|e| !matches!(e, StressEvent::ValueChanged(_)))
            .collect();
        assert_eq!(
            edges,
            vec![
                StressEvent::ZoneEntered,
                StressEvent::ZoneExited,
                StressEvent::ZoneEntered,
            ]
        );
    }

    #[test]
    fn test_exhaustion_order_and_latch() {
        let mut meter = meter_at(0.0);
        let (_, rx) = meter.subscribe_channel();

        meter.increase(100.0);
        assert!(meter.is_exhausted());
        assert_eq!(
            drain(&rx),
            vec![
                StressEvent::ValueChanged(100.0),
                StressEvent::ZoneEntered,
                StressEvent::Exhausted,
            ]
        );

        assert_eq!(
            meter.decrease(50.0),
            DeltaOutcome::Ignored(IgnoreReason::Terminal)
        );
        assert_eq!(
            meter.increase(10.0),
            DeltaOutcome::Ignored(IgnoreReason::Terminal)
        );
        assert_eq!(meter.current(), 100.0);
        assert!(meter.in_danger_zone());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_overshoot_exhausts_once() {
        let mut meter = meter_at(95.0);
        let (_, rx) = meter.subscribe_channel();

        meter.increase(30.0);
        meter.increase(30.0);

        let exhausted = drain(&rx)
            .iter()
            .filter(|e| **e == StressEvent::Exhausted)
            .count();
        assert_eq!(exhausted, 1);
        assert_eq!(meter.current(), 100.0);
    }

    #[test]
    fn test_starting_at_max_exhausts_on_first_increase() {
        let mut meter = meter_at(100.0);
        let (_, rx) = meter.subscribe_channel();
        assert!(!meter.is_exhausted());

        assert_eq!(meter.increase(1.0), DeltaOutcome::Unchanged);
        assert!(meter.is_exhausted());
        assert_eq!(drain(&rx), vec![StressEvent::Exhausted]);
    }

    #[test]
    fn test_decrease_never_exhausts() {
        let mut meter = meter_at(100.0);
        meter.decrease(0.0);
        assert!(!meter.is_exhausted());
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        let mut meter = meter_at(50.0);
        let (_, rx) = meter.subscribe_channel();

        for amount in [-5.0, f32::NAN, f32::INFINITY] {
            assert_eq!(
                meter.increase(amount),
                DeltaOutcome::Ignored(IgnoreReason::InvalidAmount)
            );
            assert_eq!(
                meter.decrease(amount),
                DeltaOutcome::Ignored(IgnoreReason::InvalidAmount)
            );
        }
        assert_eq!(meter.current(), 50.0);
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_reset_clears_terminal_without_zone_exit() {
        let mut meter = meter_at(20.0);
        meter.increase(90.0);
        assert!(meter.is_exhausted());

        let (_, rx) = meter.subscribe_channel();
        meter.reset();

        assert_eq!(meter.current(), 20.0);
        assert!(!meter.is_exhausted());
        assert!(!meter.in_danger_zone());
        assert_eq!(drain(&rx), vec![StressEvent::ValueChanged(20.0)]);

        // Mutations work again after the reset.
        assert!(meter.increase(5.0).is_applied());
        assert_eq!(meter.current(), 25.0);
    }

    #[test]
    fn test_start_inside_zone_reports_entry_on_first_change() {
        let mut meter = meter_at(90.0);
        let (_, rx) = meter.subscribe_channel();
        assert!(meter.in_danger_zone());
        assert!(meter.snapshot().in_danger_zone);

        meter.increase(1.0);
        assert_eq!(
            drain(&rx),
            vec![StressEvent::ValueChanged(91.0), StressEvent::ZoneEntered]
        );
    }

    #[test]
    fn test_reset_inside_zone_reports_level() {
        let mut meter = meter_at(85.0);
        meter.decrease(30.0);
        assert!(!meter.in_danger_zone());

        let (_, rx) = meter.subscribe_channel();
        meter.reset();
        assert!(meter.in_danger_zone());
        assert_eq!(drain(&rx), vec![StressEvent::ValueChanged(85.0)]);

        // The edge is still reported on the next change.
        meter.increase(1.0);
        assert_eq!(
            drain(&rx),
            vec![StressEvent::ValueChanged(86.0), StressEvent::ZoneEntered]
        );
    }

    #[test]
    fn test_snapshot() {
        let mut meter = meter_at(0.0);
        meter.increase(85.0);
        let snap = meter.snapshot();
        assert_eq!(snap.current, 85.0);
        assert_eq!(snap.max, 100.0);
        assert!(snap.in_danger_zone);
        assert!(!snap.exhausted);
    }

    #[test]
    fn test_with_defaults() {
        let meter = StressMeter::with_defaults();
        assert_eq!(meter.current(), 0.0);
        assert_eq!(meter.max(), 100.0);
        assert_eq!(meter.danger_threshold(), 80.0);
    }
}
