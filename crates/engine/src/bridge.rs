use std::sync::mpsc;
use std::thread;

use tracing::debug;

use crate::api::{Command, Engine, Event};
use crate::error::{EngineError, Result};
use crate::player::PlayerBackend;
use crate::time::Clock;

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Sender used by the UI and the player callback to reach the engine thread.
pub type EngineCommandSender = mpsc::SyncSender<Command>;

/// Receiver for events emitted by the engine thread.
pub type EngineEventReceiver = mpsc::Receiver<Event>;

/// Moves `engine` onto a worker thread that applies commands one at a time.
///
/// UI actions and progress reports share the command channel, so each runs
/// to completion against the latest engine state before the next starts.
/// The worker stops when every sender is dropped or the event receiver goes
/// away.
pub fn spawn_engine_bridge<P, C>(
    mut engine: Engine<P, C>,
) -> (EngineCommandSender, EngineEventReceiver)
where
    P: PlayerBackend + Send + 'static,
    C: Clock + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::sync_channel::<Command>(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::sync_channel::<Event>(EVENT_CHANNEL_CAPACITY);

    thread::spawn(move || {
        while let Ok(command) = command_rx.recv() {
            for event in engine.handle_command(command) {
                if event_tx.send(event).is_err() {
                    debug!("engine bridge event receiver dropped");
                    return;
                }
            }
        }
        debug!("engine bridge command channel closed");
    });

    (command_tx, event_rx)
}

/// Sends one command, mapping a closed channel to an engine error.
pub fn send_command(sender: &EngineCommandSender, command: Command) -> Result<()> {
    sender
        .send(command)
        .map_err(|_| EngineError::BridgeDisconnected)
}
