//! Relief items - consumables that remove stress when used.
//!
//! An item has a limited (or unlimited) number of uses and a cooldown
//! between uses. Once the last use is spent the item stays inert until
//! it is refilled.

use serde::{Deserialize, Serialize};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use stress_rules::{MeterHandle, SubscriptionId, Subscribers};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::{check_amount, ConfigError};

/// Unique identifier for relief items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Create a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of uses, either a count or unlimited.
///
/// Written as an integer in config files, with `-1` meaning unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum UseLimit {
    Unlimited,
    Limited(u32),
}

impl UseLimit {
    pub fn is_spent(&self) -> bool {
        matches!(self, UseLimit::Limited(0))
    }
}

impl TryFrom<i64> for UseLimit {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(UseLimit::Unlimited),
            n => u32::try_from(n).map(UseLimit::Limited).map_err(|_| {
                format!("use count must be -1 or between 0 and {}, got {}", u32::MAX, n)
            }),
        }
    }
}

impl From<UseLimit> for i64 {
    fn from(limit: UseLimit) -> Self {
        match limit {
            UseLimit::Unlimited => -1,
            UseLimit::Limited(n) => n as i64,
        }
    }
}

/// Configuration for one relief item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefItemConfig {
    pub name: String,
    /// Stress removed per use.
    pub reduction: f32,
    pub max_uses: UseLimit,
    /// Minimum time between uses, in seconds.
    pub cooldown_secs: f32,
}

impl Default for ReliefItemConfig {
    fn default() -> Self {
        Self {
            name: "relief item".to_string(),
            reduction: 15.0,
            max_uses: UseLimit::Limited(1),
            cooldown_secs: 0.0,
        }
    }
}

impl ReliefItemConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_reduction(mut self, reduction: f32) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn with_max_uses(mut self, max_uses: UseLimit) -> Self {
        self.max_uses = max_uses;
        self
    }

    pub fn with_cooldown_secs(mut self, cooldown_secs: f32) -> Self {
        self.cooldown_secs = cooldown_secs;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidItem {
                name: self.name.clone(),
                reason: "name must not be empty".to_string(),
            });
        }
        check_amount("relief_items.reduction", self.reduction)?;
        check_amount("relief_items.cooldown_secs", self.cooldown_secs)?;
        self.cooldown()?;
        Ok(())
    }

    /// The cooldown as a `Duration`. Fails for cooldowns too long to
    /// represent.
    pub fn cooldown(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f32(self.cooldown_secs).map_err(|e| ConfigError::InvalidItem {
            name: self.name.clone(),
            reason: format!("cooldown of {}s is out of range: {}", self.cooldown_secs, e),
        })
    }
}

/// Fired by an item after a successful use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliefSignal {
    Used { item: ItemId, remaining: UseLimit },
    /// The last use was spent.
    Empty { item: ItemId },
}

/// What happened to a use attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UseOutcome {
    Used { remaining: UseLimit },
    /// Used, and that was the last one.
    Emptied,
    /// No uses left until refilled.
    OutOfUses,
    CoolingDown { remaining: Duration },
    /// The meter is exhausted.
    GameOver,
    /// No meter to feed.
    MeterMissing,
}

impl UseOutcome {
    /// Check if stress was actually relieved.
    pub fn is_used(&self) -> bool {
        matches!(self, UseOutcome::Used { .. } | UseOutcome::Emptied)
    }
}

/// A consumable that lowers stress.
#[derive(Debug)]
pub struct ReliefItem {
    id: ItemId,
    config: ReliefItemConfig,
    cooldown: Duration,
    remaining: UseLimit,
    last_used: Option<Duration>,
    meter: MeterHandle,
    clock: Arc<dyn Clock>,
    signals: Subscribers<ReliefSignal>,
}

impl ReliefItem {
    pub fn new(
        config: ReliefItemConfig,
        meter: MeterHandle,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: ItemId::new(),
            cooldown: config.cooldown()?,
            remaining: config.max_uses,
            last_used: None,
            config,
            meter,
            clock,
            signals: Subscribers::new(),
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ReliefItemConfig {
        &self.config
    }

    pub fn remaining_uses(&self) -> UseLimit {
        self.remaining
    }

    /// Check if every use has been spent.
    pub fn is_inert(&self) -> bool {
        self.remaining.is_spent()
    }

    /// Time left before the item can be used again, if any.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let last = self.last_used?;
        (last + self.cooldown)
            .checked_sub(self.clock.now())
            .filter(|left| !left.is_zero())
    }

    pub fn can_use(&self) -> bool {
        !self.is_inert() && self.cooldown_remaining().is_none()
    }

    /// Use the item once. Does nothing when it is spent, cooling down, or
    /// the meter is exhausted or gone.
    pub fn use_item(&mut self) -> UseOutcome {
        if self.is_inert() {
            tracing::debug!("{}: no uses left", self.config.name);
            return UseOutcome::OutOfUses;
        }
        if let Some(remaining) = self.cooldown_remaining() {
            tracing::debug!(
                "{}: cooling down ({:.1}s left)",
                self.config.name,
                remaining.as_secs_f32()
            );
            return UseOutcome::CoolingDown { remaining };
        }

        let Some(meter) = self.meter.get() else {
            tracing::warn!("{}: no stress meter is attached", self.config.name);
            return UseOutcome::MeterMissing;
        };
        let reduction = self.config.reduction;
        let Some(current) = meter.unless_exhausted(|meter| {
            meter.decrease(reduction);
            meter.current()
        }) else {
            tracing::debug!("{}: meter exhausted, item not used", self.config.name);
            return UseOutcome::GameOver;
        };

        self.last_used = Some(self.clock.now());
        if let UseLimit::Limited(n) = self.remaining {
            self.remaining = UseLimit::Limited(n.saturating_sub(1));
        }
        tracing::info!(
            "{} used: -{} stress (now {:.0})",
            self.config.name,
            self.config.reduction,
            current
        );

        self.signals.publish(&ReliefSignal::Used {
            item: self.id,
            remaining: self.remaining,
        });

        if self.remaining.is_spent() {
            tracing::info!("{} is empty", self.config.name);
            self.signals.publish(&ReliefSignal::Empty { item: self.id });
            return UseOutcome::Emptied;
        }
        UseOutcome::Used {
            remaining: self.remaining,
        }
    }

    /// Restore the configured number of uses. Leaves the meter and the
    /// cooldown alone.
    pub fn refill(&mut self) {
        self.remaining = self.config.max_uses;
        tracing::debug!("{} refilled: {:?}", self.config.name, self.remaining);
    }

    /// Refill and forget the last use, as at session start.
    pub fn reset(&mut self) {
        self.refill();
        self.last_used = None;
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&ReliefSignal) + Send + 'static,
    ) -> SubscriptionId {
        self.signals.subscribe(callback)
    }

    pub fn subscribe_channel(&mut self) -> (SubscriptionId, mpsc::Receiver<ReliefSignal>) {
        self.signals.subscribe_channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.signals.unsubscribe(id)
    }
}
