//! Response feeder - turns conversational agent responses into stress.
//!
//! Every response costs a small base amount. A response tagged with the
//! reduce tag then removes a larger amount, and one tagged with the
//! increase tag adds a larger amount. The two changes are applied as
//! separate meter calls, so each shows up in the value history, but under
//! a single lock: a response either lands whole or not at all.

mod payload;

pub use payload::*;

use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use stress_rules::{MeterHandle, SubscriptionId, Subscribers};

use crate::config::{check_amount, ConfigError};

/// Deltas and tags for the response feeder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Added for every response.
    pub base_delta: f32,
    /// Removed when the reduce tag matches.
    pub reduce_delta: f32,
    /// Added when the increase tag matches.
    pub increase_delta: f32,
    pub reduce_tag: String,
    pub increase_tag: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            base_delta: 2.0,
            reduce_delta: 20.0,
            increase_delta: 20.0,
            reduce_tag: "POSITIVE".to_string(),
            increase_tag: "NEGATIVE".to_string(),
        }
    }
}

impl ResponseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_amount("responses.base_delta", self.base_delta)?;
        check_amount("responses.reduce_delta", self.reduce_delta)?;
        check_amount("responses.increase_delta", self.increase_delta)?;
        Ok(())
    }

    /// Classify a raw category tag.
    pub fn classify(&self, category: Option<&str>) -> ResponseCategory {
        match category {
            Some(tag) if tag_matches(tag, &self.reduce_tag) => ResponseCategory::Positive,
            Some(tag) if tag_matches(tag, &self.increase_tag) => ResponseCategory::Negative,
            _ => ResponseCategory::Neutral,
        }
    }
}

/// Running response counts for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseTally {
    pub total_responses: u32,
    pub total_positive: u32,
    pub total_negative: u32,
}

/// Fired after a categorized response has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseSignal {
    Positive,
    Negative,
}

/// What happened to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOutcome {
    Applied(ResponseCategory),
    /// The meter is exhausted; counters stay frozen.
    GameOver,
    /// No meter to feed.
    MeterMissing,
}

/// Feeds agent responses into the session's meter.
#[derive(Debug)]
pub struct ResponseFeeder {
    meter: MeterHandle,
    config: ResponseConfig,
    tally: ResponseTally,
    signals: Subscribers<ResponseSignal>,
}

impl ResponseFeeder {
    pub fn new(meter: MeterHandle, config: ResponseConfig) -> Self {
        Self {
            meter,
            config,
            tally: ResponseTally::default(),
            signals: Subscribers::new(),
        }
    }

    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    pub fn tally(&self) -> ResponseTally {
        self.tally
    }

    /// Handle one response with an optional category tag.
    pub fn on_response(&mut self, category: Option<&str>) -> ResponseOutcome {
        let category = self.config.classify(category);
        self.apply(category)
    }

    /// Handle a parsed chat response, using its action as the category.
    pub fn on_chat_response(&mut self, response: &ChatResponse) -> ResponseOutcome {
        self.on_response(response.category())
    }

    /// Handle a spoken response. Audio carries no category, so only the
    /// base cost applies.
    pub fn on_audio_response(&mut self) -> ResponseOutcome {
        self.apply(ResponseCategory::Neutral)
    }

    /// Clear the counters. Only the owning session should call this.
    pub fn reset_counters(&mut self) {
        self.tally = ResponseTally::default();
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&ResponseSignal) + Send + 'static,
    ) -> SubscriptionId {
        self.signals.subscribe(callback)
    }

    pub fn subscribe_channel(&mut self) -> (SubscriptionId, mpsc::Receiver<ResponseSignal>) {
        self.signals.subscribe_channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.signals.unsubscribe(id)
    }

    fn apply(&mut self, category: ResponseCategory) -> ResponseOutcome {
        let Some(meter) = self.meter.get() else {
            tracing::warn!("Response received but no stress meter is attached");
            return ResponseOutcome::MeterMissing;
        };
        let config = &self.config;
        let applied = meter.unless_exhausted(|meter| {
            meter.increase(config.base_delta);
            match category {
                ResponseCategory::Positive => {
                    meter.decrease(config.reduce_delta);
                }
                ResponseCategory::Negative => {
                    meter.increase(config.increase_delta);
                }
                ResponseCategory::Neutral => {}
            }
        });
        if applied.is_none() {
            tracing::debug!("Response ignored: meter exhausted");
            return ResponseOutcome::GameOver;
        }

        self.tally.total_responses += 1;
        tracing::debug!(
            "Response #{} -> +{} stress",
            self.tally.total_responses,
            self.config.base_delta
        );

        match category {
            ResponseCategory::Positive => {
                self.tally.total_positive += 1;
                self.signals.publish(&ResponseSignal::Positive);
                tracing::info!(
                    "Positive response -> -{} stress (total {})",
                    self.config.reduce_delta,
                    self.tally.total_positive
                );
            }
            ResponseCategory::Negative => {
                self.tally.total_negative += 1;
                self.signals.publish(&ResponseSignal::Negative);
                tracing::info!(
                    "Negative response -> +{} stress (total {})",
                    self.config.increase_delta,
                    self.tally.total_negative
                );
            }
            ResponseCategory::Neutral => {}
        }

        ResponseOutcome::Applied(category)
    }
}
