pub mod clock;
pub mod context;
pub mod cues;
pub mod engine;
pub mod events;
pub mod plan;
pub mod progress;

// Re-exports for convenience
pub use clock::{ClockError, format_hmmss, format_mmss, parse_clock};
pub use context::{AppConfigExt, ConfigError};
pub use cues::{CueError, CueHandle, CuePlayer, CueRegistry, NullCuePlayer, Tone};
pub use engine::{
    EngineError, EngineHandle, RunSnapshot, RunStatus, RunnerError, TimerEngine, spawn_engine,
};
pub use events::{ChannelSink, EventSink, Notification, TimerEvent};
pub use hiit_types::{AppConfig, PhaseKind, Settings};
pub use plan::{Phase, PhaseStep, Plan, build_plan, total_time};
pub use progress::progress;
