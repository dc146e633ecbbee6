use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{PendingSeekPolicy, SyncConfig};
use crate::mapper::{actual_to_virtual, virtual_to_actual};
use crate::player::{PlayerBackend, PlayerCommand};
use crate::progress::{ProgressDecision, decide_progress};
use crate::seek::SeekGate;
use crate::state::PlaybackState;
use crate::time::{Clock, SystemClock, is_valid_seconds};
use crate::timeline::{Clip, ClipRange, ClipTimeline};

/// Commands accepted by the engine.
///
/// UI actions and player reports share one command stream so that each is
/// applied to the latest clip list, index and mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Replaces the clip list and resets the clip index.
    ReplaceClips {
        clips: Vec<Clip>,
    },
    /// Starts sequence playback at clip `index`. Ignored when out of range.
    JumpToClip {
        index: usize,
    },
    PlayAllClips,
    /// Pauses the player and leaves sequence mode. The clip index is kept.
    StopPlayback,
    SkipToPreviousClip,
    SkipToNextClip,
    SeekToVirtualTime {
        virtual_time: f64,
    },
    TogglePlay,
    /// Leaves sequence mode after the user touched the player's own controls.
    ExitClipMode,
    /// Periodic position report from the player.
    Progress {
        played_seconds: f64,
    },
    PlayStateChanged {
        playing: bool,
    },
    PlayerReady,
}

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ClipsChanged(ClipsSnapshot),
    ClipIndexChanged { index: Option<usize> },
    ModeChanged { virtual_mode: bool },
    PositionChanged { actual_time: f64, virtual_time: f64 },
    PlayingChanged { playing: bool },
    SequenceFinished { index: usize },
}

/// Virtual timeline layout for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipsSnapshot {
    pub ranges: Vec<ClipRange>,
    pub total_virtual_duration: f64,
}

/// Everything the UI reads from the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSnapshot {
    pub state: PlaybackState,
    pub clip_index: Option<usize>,
    pub virtual_mode: bool,
    pub ranges: Vec<ClipRange>,
    pub total_virtual_duration: f64,
    pub actual_time: f64,
    pub virtual_time: f64,
    pub playing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSeek {
    actual_time: f64,
    play: bool,
}

/// Clip playback synchronization engine.
///
/// Owns the clip list, the playback state and the player. Every position
/// change goes through [`Engine::perform_seek`]; every player report goes
/// through the progress handler.
#[derive(Debug)]
pub struct Engine<P, C = SystemClock> {
    player: P,
    clock: C,
    config: SyncConfig,
    timeline: ClipTimeline,
    state: PlaybackState,
    seek_gate: SeekGate,
    actual_time: f64,
    playing: bool,
    pending_seek: Option<PendingSeek>,
}

impl<P> Engine<P, SystemClock>
where
    P: PlayerBackend,
{
    /// Creates an engine with the default config and the system clock.
    ///
    /// # Example
    /// ```
    /// use clip_engine::{Command, Engine, PlayerBackend};
    /// use clip_engine::timeline::Clip;
    ///
    /// struct Silent;
    ///
    /// impl PlayerBackend for Silent {
    ///     fn seek_to(&mut self, _seconds: f64) {}
    ///     fn play(&mut self) {}
    ///     fn pause(&mut self) {}
    /// }
    ///
    /// let mut engine = Engine::new(Silent);
    /// engine.handle_command(Command::ReplaceClips {
    ///     clips: vec![Clip::new(0.0, 10.0), Clip::new(20.0, 30.0)],
    /// });
    /// engine.handle_command(Command::JumpToClip { index: 1 });
    /// assert_eq!(engine.clip_index(), Some(1));
    /// assert!(engine.is_virtual_mode());
    /// ```
    pub fn new(player: P) -> Self {
        Self::with_clock(player, SystemClock, SyncConfig::default())
    }
}

impl<P, C> Engine<P, C>
where
    P: PlayerBackend,
    C: Clock,
{
    pub fn with_clock(player: P, clock: C, config: SyncConfig) -> Self {
        Self {
            player,
            clock,
            config,
            timeline: ClipTimeline::default(),
            state: PlaybackState::Idle,
            seek_gate: SeekGate::default(),
            actual_time: 0.0,
            playing: false,
            pending_seek: None,
        }
    }

    /// Applies one command and returns emitted events.
    pub fn handle_command(&mut self, command: Command) -> Vec<Event> {
        match command {
            Command::ReplaceClips { clips } => self.replace_clips(clips),
            Command::JumpToClip { index } => self.jump_to_clip(index),
            Command::PlayAllClips => self.play_all_clips(),
            Command::StopPlayback => self.stop_playback(),
            Command::SkipToPreviousClip => self.skip_to_previous_clip(),
            Command::SkipToNextClip => self.skip_to_next_clip(),
            Command::SeekToVirtualTime { virtual_time } => self.seek_to_virtual_time(virtual_time),
            Command::TogglePlay => self.toggle_play(),
            Command::ExitClipMode => self.exit_clip_mode(),
            Command::Progress { played_seconds } => self.on_progress(played_seconds),
            Command::PlayStateChanged { playing } => {
                let mut events = Vec::new();
                self.set_playing(playing, &mut events);
                events
            }
            Command::PlayerReady => self.flush_pending_seek(),
        }
    }

    /// Moves playback to `actual_time` and makes `clip_index` current.
    ///
    /// The seek is stamped before anything else so that progress reports
    /// arriving during the grace window cannot override the new index. The
    /// index is updated before the player is commanded. Indices past the last
    /// clip are clamped to it.
    pub fn perform_seek(
        &mut self,
        actual_time: f64,
        clip_index: Option<usize>,
        should_play: bool,
    ) -> Vec<Event> {
        let clamped =
            clip_index.and_then(|index| self.timeline.last_index().map(|last| index.min(last)));
        if clamped != clip_index {
            warn!(
                requested = ?clip_index,
                clamped = ?clamped,
                clip_count = self.timeline.len(),
                "seek clip index out of range"
            );
        }
        self.seek_into(actual_time, self.state.with_clip(clamped), should_play)
    }

    fn seek_into(
        &mut self,
        actual_time: f64,
        next: PlaybackState,
        should_play: bool,
    ) -> Vec<Event> {
        let mut events = Vec::new();
        if !is_valid_seconds(actual_time) {
            warn!(actual_time, "seek ignored: invalid target time");
            return events;
        }

        self.seek_gate.stamp(self.clock.now());

        let previous = self.state;
        self.state = next;
        if previous.is_virtual_mode() != next.is_virtual_mode() {
            events.push(Event::ModeChanged {
                virtual_mode: next.is_virtual_mode(),
            });
        }
        events.push(Event::ClipIndexChanged {
            index: next.clip_index(),
        });

        debug!(
            actual_time,
            should_play,
            state = ?self.state,
            "seek issued"
        );

        if self.player.is_ready() {
            self.player.seek_to(actual_time);
            if should_play {
                self.send_to_player(PlayerCommand::Play, &mut events);
            }
        } else {
            self.defer_seek(actual_time, should_play);
        }

        events
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn clip_index(&self) -> Option<usize> {
        self.state.clip_index()
    }

    pub fn is_virtual_mode(&self) -> bool {
        self.state.is_virtual_mode()
    }

    pub fn clips(&self) -> &[Clip] {
        self.timeline.clips()
    }

    pub fn ranges(&self) -> &[ClipRange] {
        self.timeline.ranges()
    }

    pub fn total_virtual_duration(&self) -> f64 {
        self.timeline.total_virtual_duration()
    }

    pub fn current_actual_time(&self) -> f64 {
        self.actual_time
    }

    pub fn current_virtual_time(&self) -> f64 {
        actual_to_virtual(self.actual_time, self.timeline.ranges())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Creates an immutable snapshot for the UI.
    pub fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            state: self.state,
            clip_index: self.clip_index(),
            virtual_mode: self.is_virtual_mode(),
            ranges: self.timeline.ranges().to_vec(),
            total_virtual_duration: self.total_virtual_duration(),
            actual_time: self.actual_time,
            virtual_time: self.current_virtual_time(),
            playing: self.playing,
        }
    }

    fn clips_snapshot(&self) -> ClipsSnapshot {
        ClipsSnapshot {
            ranges: self.timeline.ranges().to_vec(),
            total_virtual_duration: self.total_virtual_duration(),
        }
    }

    fn replace_clips(&mut self, clips: Vec<Clip>) -> Vec<Event> {
        self.timeline = ClipTimeline::new(clips);
        info!(
            clip_count = self.timeline.len(),
            total_virtual = self.total_virtual_duration(),
            previous_state = ?self.state,
            "clip list replaced"
        );

        if self.pending_seek.take().is_some() {
            debug!("deferred seek discarded with previous clip list");
        }

        let mut events = vec![Event::ClipsChanged(self.clips_snapshot())];
        self.set_state(PlaybackState::Idle, &mut events);
        events.push(self.position_event());
        events
    }

    fn jump_to_clip(&mut self, index: usize) -> Vec<Event> {
        let Some(clip) = self.timeline.clip(index).copied() else {
            warn!(
                index,
                clip_count = self.timeline.len(),
                "jump ignored: clip index out of range"
            );
            return Vec::new();
        };
        self.start_sequence_at(index, clip)
    }

    fn play_all_clips(&mut self) -> Vec<Event> {
        let Some(first) = self.timeline.clip(0).copied() else {
            return Vec::new();
        };
        self.start_sequence_at(0, first)
    }

    fn start_sequence_at(&mut self, index: usize, clip: Clip) -> Vec<Event> {
        info!(index, start_time = clip.start_time, "clip sequence started");
        self.seek_into(clip.start_time, self.state.enter_sequence(index), true)
    }

    fn stop_playback(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(pending) = self.pending_seek.as_mut() {
            pending.play = false;
        }
        self.send_to_player(PlayerCommand::Pause, &mut events);
        self.set_state(self.state.exit_sequence(), &mut events);
        events
    }

    fn exit_clip_mode(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state.is_virtual_mode() {
            debug!(state = ?self.state, "clip mode exited");
            self.set_state(self.state.exit_sequence(), &mut events);
        }
        events
    }

    fn skip_to_previous_clip(&mut self) -> Vec<Event> {
        let Some(last) = self.timeline.last_index() else {
            return Vec::new();
        };
        let target = self
            .state
            .clip_index()
            .map_or(0, |index| index.saturating_sub(1))
            .min(last);
        self.seek_to_clip_start(target)
    }

    fn skip_to_next_clip(&mut self) -> Vec<Event> {
        let Some(last) = self.timeline.last_index() else {
            return Vec::new();
        };
        let target = self
            .state
            .clip_index()
            .map_or(0, |index| index.saturating_add(1))
            .min(last);
        self.seek_to_clip_start(target)
    }

    fn seek_to_clip_start(&mut self, index: usize) -> Vec<Event> {
        let Some(clip) = self.timeline.clip(index).copied() else {
            return Vec::new();
        };
        self.perform_seek(clip.start_time, Some(index), false)
    }

    fn seek_to_virtual_time(&mut self, virtual_time: f64) -> Vec<Event> {
        if self.timeline.is_empty() {
            return Vec::new();
        }
        if !virtual_time.is_finite() {
            warn!(virtual_time, "virtual seek ignored: non-finite time");
            return Vec::new();
        }

        let target = virtual_to_actual(virtual_time, self.timeline.ranges());
        self.perform_seek(target.actual_time, target.clip_index, false)
    }

    fn toggle_play(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let command = if self.playing {
            PlayerCommand::Pause
        } else {
            PlayerCommand::Play
        };
        self.send_to_player(command, &mut events);
        events
    }

    fn on_progress(&mut self, played_seconds: f64) -> Vec<Event> {
        if !is_valid_seconds(played_seconds) {
            warn!(played_seconds, "progress report ignored: invalid position");
            return Vec::new();
        }

        self.actual_time = played_seconds;
        let mut events = vec![self.position_event()];

        let now = self.clock.now();
        if self.seek_gate.suppresses(now, self.config.seek_grace()) {
            debug!(played_seconds, "progress within seek grace window");
            return events;
        }

        let decision = decide_progress(self.state, &self.timeline, played_seconds, &self.config);
        match decision {
            ProgressDecision::Unchanged => {}
            ProgressDecision::Track(index) => {
                debug!(played_seconds, index = ?index, "playback entered another clip");
                self.set_state(self.state.with_clip(index), &mut events);
            }
            ProgressDecision::Advance { next } => {
                if let Some(clip) = self.timeline.clip(next).copied() {
                    debug!(played_seconds, next, "auto-advancing to next clip");
                    events.extend(self.perform_seek(clip.start_time, Some(next), false));
                }
            }
            ProgressDecision::Finish => {
                self.send_to_player(PlayerCommand::Pause, &mut events);
                self.set_state(self.state.finish_sequence(), &mut events);
                if let Some(index) = self.state.clip_index() {
                    info!(played_seconds, index, "clip sequence finished");
                    events.push(Event::SequenceFinished { index });
                }
            }
        }

        events
    }

    fn flush_pending_seek(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        let Some(pending) = self.pending_seek.take() else {
            return events;
        };
        if !self.player.is_ready() {
            self.pending_seek = Some(pending);
            return events;
        }

        debug!(
            actual_time = pending.actual_time,
            play = pending.play,
            "flushing deferred seek"
        );
        self.seek_gate.stamp(self.clock.now());
        self.player.seek_to(pending.actual_time);
        if pending.play {
            self.send_to_player(PlayerCommand::Play, &mut events);
        }
        events
    }

    fn defer_seek(&mut self, actual_time: f64, play: bool) {
        match self.config.pending_seek {
            PendingSeekPolicy::Drop => {
                debug!(actual_time, "player not ready: seek dropped");
            }
            PendingSeekPolicy::FlushOnReady => {
                debug!(actual_time, play, "player not ready: seek deferred");
                self.pending_seek = Some(PendingSeek { actual_time, play });
            }
        }
    }

    fn send_to_player(&mut self, command: PlayerCommand, events: &mut Vec<Event>) {
        if !self.player.is_ready() {
            debug!(?command, "player not ready: command dropped");
            return;
        }
        command.apply(&mut self.player);
        match command {
            PlayerCommand::Play => self.set_playing(true, events),
            PlayerCommand::Pause => self.set_playing(false, events),
            PlayerCommand::SeekTo { .. } => {}
        }
    }

    fn set_playing(&mut self, playing: bool, events: &mut Vec<Event>) {
        if self.playing != playing {
            self.playing = playing;
            events.push(Event::PlayingChanged { playing });
        }
    }

    fn set_state(&mut self, next: PlaybackState, events: &mut Vec<Event>) {
        let previous = self.state;
        self.state = next;
        if previous.is_virtual_mode() != next.is_virtual_mode() {
            events.push(Event::ModeChanged {
                virtual_mode: next.is_virtual_mode(),
            });
        }
        if previous.clip_index() != next.clip_index() {
            events.push(Event::ClipIndexChanged {
                index: next.clip_index(),
            });
        }
    }

    fn position_event(&self) -> Event {
        Event::PositionChanged {
            actual_time: self.actual_time,
            virtual_time: self.current_virtual_time(),
        }
    }
}
