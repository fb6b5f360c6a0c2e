//! # Stress Feeders
//!
//! Adapters that turn outside signals into stress changes on a
//! `stress_rules` meter, and the session that wires them together.
//!
//! ## Core Components
//!
//! - **response**: Conversational agent responses (chat and audio) -> base cost plus tagged adjustments
//! - **relief**: Consumable items with limited uses and cooldowns -> stress relief
//! - **session**: Composition root owning the meter and every feeder
//! - **config**: TOML session configuration
//!
//! Feeders hold a non-owning handle to the meter. If the meter is gone they
//! skip the whole operation; if it is exhausted they leave their own state
//! untouched.

pub mod clock;
pub mod config;
pub mod relief;
pub mod response;
pub mod session;

pub use clock::*;
pub use config::*;
pub use relief::*;
pub use response::*;
pub use session::*;
