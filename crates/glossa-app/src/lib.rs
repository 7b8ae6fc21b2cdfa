pub mod controller;
pub mod error;
pub mod events;
pub mod page;
pub mod state;
pub mod telemetry;
pub mod timers;

#[cfg(test)]
mod tests;

pub use controller::{ChannelSet, Widget, initialize, initialize_with_source};
pub use error::WidgetError;
pub use state::WidgetStats;
