//! Clip playback synchronization engine.
//!
//! Plays a list of clips inside one media timeline back to back, keeping a
//! gapless virtual timeline in step with the external player's position.

pub mod api;
pub mod bridge;
pub mod config;
pub mod error;
pub mod mapper;
pub mod player;
pub mod progress;
pub mod seek;
pub mod state;
pub mod time;
pub mod timeline;

pub use api::{ClipsSnapshot, Command, Engine, Event, SyncSnapshot};
pub use bridge::{EngineCommandSender, EngineEventReceiver, send_command, spawn_engine_bridge};
pub use config::{PendingSeekPolicy, SyncConfig};
pub use error::{EngineError, Result};
pub use mapper::{ActualTarget, actual_to_virtual, virtual_to_actual};
pub use player::{PlayerBackend, PlayerCommand};
pub use state::PlaybackState;
pub use time::{Clock, ManualClock, SystemClock};
pub use timeline::{Clip, ClipRange, ClipTimeline, compute_ranges, total_virtual_duration};
