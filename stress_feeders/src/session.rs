//! The session - owns the meter and wires every feeder to it.

use std::path::Path;
use std::sync::Arc;
use stress_rules::{MeterReadout, SharedMeter, StressMeter};

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, SessionConfig};
use crate::relief::{ReliefItem, UseOutcome};
use crate::response::ResponseFeeder;

/// One play session: a single meter plus the feeders that drive it.
///
/// Dropping the session drops the meter; any feeder handle that outlives
/// it turns into a no-op.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    meter: SharedMeter,
    responses: ResponseFeeder,
    items: Vec<ReliefItem>,
}

impl Session {
    pub fn new(config: SessionConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;

        let meter = SharedMeter::new(StressMeter::new(config.meter)?);
        let responses = ResponseFeeder::new(meter.handle(), config.responses.clone());
        let items = config
            .relief_items
            .iter()
            .map(|item| ReliefItem::new(item.clone(), meter.handle(), Arc::clone(&clock)))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "Session started: stress {:.0}/{:.0}, danger at {:.0}, {} relief item(s)",
            meter.current(),
            meter.max(),
            meter.danger_threshold(),
            items.len()
        );

        Ok(Self {
            config,
            meter,
            responses,
            items,
        })
    }

    /// Start a session on the wall clock.
    pub fn with_system_clock(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::new(config, Arc::new(SystemClock::new()))
    }

    pub fn from_file(path: &Path, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        Self::new(SessionConfig::from_file(path)?, clock)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn meter(&self) -> &SharedMeter {
        &self.meter
    }

    pub fn responses(&self) -> &ResponseFeeder {
        &self.responses
    }

    pub fn responses_mut(&mut self) -> &mut ResponseFeeder {
        &mut self.responses
    }

    pub fn items(&self) -> &[ReliefItem] {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&ReliefItem> {
        self.items.iter().find(|item| item.name() == name)
    }

    pub fn item_mut(&mut self, name: &str) -> Option<&mut ReliefItem> {
        self.items.iter_mut().find(|item| item.name() == name)
    }

    /// Use a relief item by name. Returns `None` for unknown names.
    pub fn use_item(&mut self, name: &str) -> Option<UseOutcome> {
        let Some(item) = self.item_mut(name) else {
            tracing::warn!("No relief item named '{}'", name);
            return None;
        };
        Some(item.use_item())
    }

    /// Refill a relief item by name. Returns false for unknown names.
    pub fn refill_item(&mut self, name: &str) -> bool {
        match self.item_mut(name) {
            Some(item) => {
                item.refill();
                true
            }
            None => false,
        }
    }

    pub fn readout(&self) -> MeterReadout {
        MeterReadout::from_snapshot(&self.meter.snapshot())
    }

    /// Put everything back to how the session started: meter at its
    /// starting value, counters cleared, items full and off cooldown.
    /// Subscriptions are kept.
    pub fn reset(&mut self) {
        self.meter.reset();
        self.responses.reset_counters();
        for item in &mut self.items {
            item.reset();
        }
        tracing::info!("Session reset");
    }
}
