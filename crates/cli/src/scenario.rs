use std::time::Duration;

use clip_engine::{
    Clip, Command, Engine, Event, ManualClock, PlayerCommand, SyncConfig, SyncSnapshot,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::player::ScriptedPlayer;

/// A scripted playback session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub config: Option<SyncConfig>,
    /// When set, the player rejects commands until this time.
    #[serde(default)]
    pub player_ready_at_ms: Option<u64>,
    pub steps: Vec<Step>,
}

/// One command applied at a point in session time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    pub command: Command,
}

/// One line of replay output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayRecord {
    Player { at_ms: u64, command: PlayerCommand },
    Event { at_ms: u64, event: Event },
    Final { snapshot: SyncSnapshot },
}

/// Runs a scenario against a scripted player on a manual clock.
///
/// Steps are applied in file order; `at_ms` only moves the clock forward.
/// `config` overrides the scenario's own config when given.
pub fn replay(
    scenario: Scenario,
    config: Option<SyncConfig>,
) -> anyhow::Result<Vec<ReplayRecord>> {
    let config = config.or(scenario.config).unwrap_or_default();
    config.validate()?;

    let clock = ManualClock::new();
    let player = ScriptedPlayer::new(scenario.player_ready_at_ms.is_none());
    let mut engine = Engine::with_clock(player, clock.clone(), config);
    let mut records = Vec::new();

    apply(
        &mut engine,
        0,
        Command::ReplaceClips {
            clips: scenario.clips,
        },
        &mut records,
    );

    let mut ready_at = scenario.player_ready_at_ms;
    for step in scenario.steps {
        if let Some(at_ms) = ready_at.filter(|at_ms| *at_ms <= step.at_ms) {
            clock.advance_to(Duration::from_millis(at_ms));
            engine.player_mut().set_ready(true);
            apply(&mut engine, at_ms, Command::PlayerReady, &mut records);
            ready_at = None;
        }

        clock.advance_to(Duration::from_millis(step.at_ms));
        apply(&mut engine, step.at_ms, step.command, &mut records);
    }

    let snapshot = engine.snapshot();
    info!(
        state = ?snapshot.state,
        virtual_time = snapshot.virtual_time,
        "replay finished"
    );
    records.push(ReplayRecord::Final { snapshot });
    Ok(records)
}

fn apply(
    engine: &mut Engine<ScriptedPlayer, ManualClock>,
    at_ms: u64,
    command: Command,
    records: &mut Vec<ReplayRecord>,
) {
    let events = engine.handle_command(command);
    records.extend(
        engine
            .player_mut()
            .drain()
            .into_iter()
            .map(|command| ReplayRecord::Player { at_ms, command }),
    );
    records.extend(
        events
            .into_iter()
            .map(|event| ReplayRecord::Event { at_ms, event }),
    );
}

#[cfg(test)]
mod tests {
    use clip_engine::{Event, PlaybackState, PlayerCommand, SyncConfig};

    use super::{ReplayRecord, Scenario, replay};

    const TWO_CLIP_SESSION: &str = r#"{
        "clips": [
            { "start_time": 0.0, "end_time": 10.0 },
            { "start_time": 20.0, "end_time": 30.0 }
        ],
        "steps": [
            { "at_ms": 0, "command": { "type": "play_all_clips" } },
            { "at_ms": 250, "command": { "type": "progress", "played_seconds": 9.95 } },
            { "at_ms": 900, "command": { "type": "progress", "played_seconds": 9.95 } },
            { "at_ms": 1100, "command": { "type": "progress", "played_seconds": 10.2 } },
            { "at_ms": 2000, "command": { "type": "progress", "played_seconds": 29.95 } }
        ]
    }"#;

    fn player_commands(records: &[ReplayRecord]) -> Vec<(u64, PlayerCommand)> {
        records
            .iter()
            .filter_map(|record| match record {
                ReplayRecord::Player { at_ms, command } => Some((*at_ms, *command)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn replay_runs_sequence_to_completion() {
        let scenario: Scenario = serde_json::from_str(TWO_CLIP_SESSION).expect("parse scenario");

        let records = replay(scenario, None).expect("replay should succeed");

        assert_eq!(
            player_commands(&records),
            vec![
                (0, PlayerCommand::SeekTo { seconds: 0.0 }),
                (0, PlayerCommand::Play),
                (900, PlayerCommand::SeekTo { seconds: 20.0 }),
                (2000, PlayerCommand::Pause),
            ]
        );
        assert!(records.contains(&ReplayRecord::Event {
            at_ms: 2000,
            event: Event::SequenceFinished { index: 1 },
        }));
        let Some(ReplayRecord::Final { snapshot }) = records.last() else {
            panic!("replay must end with a final snapshot");
        };
        assert_eq!(snapshot.state, PlaybackState::SequenceEnded(1));
    }

    #[test]
    fn replay_with_late_player_flushes_latest_seek_when_configured() {
        let mut scenario: Scenario =
            serde_json::from_str(TWO_CLIP_SESSION).expect("parse scenario");
        scenario.player_ready_at_ms = Some(100);
        scenario.steps.truncate(1);
        scenario.steps.push(super::Step {
            at_ms: 150,
            command: clip_engine::Command::Progress {
                played_seconds: 0.1,
            },
        });
        let config = SyncConfig {
            pending_seek: clip_engine::PendingSeekPolicy::FlushOnReady,
            ..SyncConfig::default()
        };

        let records = replay(scenario, Some(config)).expect("replay should succeed");

        assert_eq!(
            player_commands(&records),
            vec![
                (100, PlayerCommand::SeekTo { seconds: 0.0 }),
                (100, PlayerCommand::Play),
            ]
        );
    }

    #[test]
    fn replay_rejects_invalid_config() {
        let scenario: Scenario = serde_json::from_str(TWO_CLIP_SESSION).expect("parse scenario");
        let config = SyncConfig {
            end_tolerance_secs: f64::NAN,
            ..SyncConfig::default()
        };

        assert!(replay(scenario, Some(config)).is_err());
    }
}
