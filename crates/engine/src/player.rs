use serde::{Deserialize, Serialize};

/// Commands the engine sends to the external media player.
///
/// The player accepts them asynchronously and never acknowledges completion;
/// its position comes back later through progress reports.
pub trait PlayerBackend {
    fn seek_to(&mut self, seconds: f64);

    fn play(&mut self);

    fn pause(&mut self);

    /// Whether the player currently accepts commands.
    fn is_ready(&self) -> bool {
        true
    }
}

/// One player command, for backends that record or forward what they receive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerCommand {
    SeekTo { seconds: f64 },
    Play,
    Pause,
}

impl PlayerCommand {
    /// Applies this command to a backend.
    pub fn apply<P>(self, player: &mut P)
    where
        P: PlayerBackend + ?Sized,
    {
        match self {
            Self::SeekTo { seconds } => player.seek_to(seconds),
            Self::Play => player.play(),
            Self::Pause => player.pause(),
        }
    }
}

impl<P> PlayerBackend for Box<P>
where
    P: PlayerBackend + ?Sized,
{
    fn seek_to(&mut self, seconds: f64) {
        (**self).seek_to(seconds);
    }

    fn play(&mut self) {
        (**self).play();
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}
