//! Engine events
//!
//! The engine reports everything a UI or notification collaborator needs
//! as [`TimerEvent`]s delivered to an [`EventSink`]. Delivery is best-effort:
//! sinks cannot fail back into the engine.

mod event;
mod sink;

pub use event::{Notification, TimerEvent};
pub use sink::{ChannelSink, EventSink};
