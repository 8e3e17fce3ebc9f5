/// Session loop — drives an engine through its external collaborators.
///
/// The engine knows nothing about screens, keyboards or speakers. A
/// front end implements the three traits below and hands them to
/// `run_session`.

use log::{debug, info, warn};
use std::io;
use thiserror::Error;

use crate::core::engine::{EngineError, NarrativeEngine, Scene};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Supplies the player's 1-based choice.
pub trait ChoiceInput {
    /// Ask for a choice in `1..=max`. `Ok(None)` means the player quit.
    fn get_choice(&mut self, max: usize) -> io::Result<Option<usize>>;
}

/// Renders the current scene. Layout is entirely its business.
pub trait SceneDisplay {
    fn show(&mut self, scene: &Scene<'_>) -> io::Result<()>;

    /// Called when a choice was rejected and the player is re-prompted.
    fn reject(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Plays an audio reference. Fire-and-forget.
pub trait AudioSink {
    fn play(&mut self, audio: &str);
}

/// Sink that ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl AudioSink for Silence {
    fn play(&mut self, _audio: &str) {}
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Reached an ending node.
    Finished {
        ending: String,
        turns: usize,
        plot_points: u32,
    },
    /// The input collaborator reported a quit.
    Quit { turns: usize },
}

/// Play from the engine's current position until an ending or a quit.
pub fn run_session(
    engine: &mut NarrativeEngine,
    input: &mut dyn ChoiceInput,
    display: &mut dyn SceneDisplay,
    audio: &mut dyn AudioSink,
) -> Result<SessionOutcome, SessionError> {
    let mut turns = 0;
    info!("session started at '{}'", engine.current_node_id()?);

    display.show(&engine.current_scene()?)?;
    if let Some(track) = engine.current_audio()? {
        audio.play(track);
    }

    loop {
        if engine.is_game_over()? {
            let state = engine.state()?;
            info!(
                "session finished at '{}' after {} turns",
                state.current_node_id, turns
            );
            return Ok(SessionOutcome::Finished {
                ending: state.current_node_id.clone(),
                turns,
                plot_points: state.plot_point_counter,
            });
        }

        let max = engine.current_options()?.len();
        let choice = match input.get_choice(max)? {
            Some(choice) => choice,
            None => {
                info!("player quit after {} turns", turns);
                return Ok(SessionOutcome::Quit { turns });
            }
        };

        let transition = match engine.handle_choice(choice) {
            Ok(transition) => transition,
            Err(EngineError::OutOfRange { choice, max }) => {
                warn!("rejected choice {} (1-{})", choice, max);
                display.reject(&format!("Choose between 1 and {}.", max))?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        turns += 1;
        debug!("turn {}: {:?}", turns, transition.kind);

        display.show(&engine.current_scene()?)?;
        if let Some(track) = engine.current_audio()? {
            audio.play(track);
        }
    }
}
