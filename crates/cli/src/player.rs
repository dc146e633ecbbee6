use clip_engine::{PlayerBackend, PlayerCommand};
use tracing::debug;

/// Stand-in for the media player: remembers commands until drained.
#[derive(Debug)]
pub struct ScriptedPlayer {
    ready: bool,
    pending: Vec<PlayerCommand>,
}

impl ScriptedPlayer {
    pub fn new(ready: bool) -> Self {
        Self {
            ready,
            pending: Vec::new(),
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn drain(&mut self) -> Vec<PlayerCommand> {
        std::mem::take(&mut self.pending)
    }

    fn record(&mut self, command: PlayerCommand) {
        debug!(?command, "player command");
        self.pending.push(command);
    }
}

impl PlayerBackend for ScriptedPlayer {
    fn seek_to(&mut self, seconds: f64) {
        self.record(PlayerCommand::SeekTo { seconds });
    }

    fn play(&mut self) {
        self.record(PlayerCommand::Play);
    }

    fn pause(&mut self) {
        self.record(PlayerCommand::Pause);
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}
