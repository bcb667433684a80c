use crate::error::AnnotatorError;
use std::collections::HashMap;
use tokio::time::Instant;
use tracing::debug;

/// Player state-change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

/// Capabilities of an embeddable video player.
pub trait Player: Send {
    fn load_video_by_id(&mut self, video_id: &str) -> Result<(), AnnotatorError>;

    /// Playback position in seconds.
    fn current_time(&self) -> f64;

    fn seek_to(&mut self, seconds: f64) -> Result<(), AnnotatorError>;

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), AnnotatorError>;

    /// Title of the loaded video, once the player knows it.
    fn video_title(&self) -> Option<String>;

    fn play_video(&mut self) -> Result<(), AnnotatorError>;

    fn pause_video(&mut self) -> Result<(), AnnotatorError>;
}

pub type StateListener = Box<dyn Fn(PlayerState) + Send>;

/// Player driven by the clock instead of a real decoder.
///
/// While playing, the position advances with elapsed time scaled by the
/// playback rate.
pub struct SimulatedPlayer {
    titles: HashMap<String, String>,
    video_id: Option<String>,
    position: f64, // seconds at `anchor`
    anchor: Instant,
    playing: bool,
    rate: f64,
    listener: Option<StateListener>,
}

impl SimulatedPlayer {
    pub fn new(titles: HashMap<String, String>) -> Self {
        Self {
            titles,
            video_id: None,
            position: 0.0,
            anchor: Instant::now(),
            playing: false,
            rate: 1.0,
            listener: None,
        }
    }

    /// Register the receiver of state-change notifications.
    pub fn on_state_change(mut self, listener: StateListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn reanchor(&mut self) {
        self.position = self.current_time();
        self.anchor = Instant::now();
    }

    fn notify(&self, state: PlayerState) {
        debug!("Player state: {:?}", state);
        if let Some(listener) = &self.listener {
            listener(state);
        }
    }
}

impl std::fmt::Debug for SimulatedPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedPlayer")
            .field("video_id", &self.video_id)
            .field("position", &self.position)
            .field("playing", &self.playing)
            .field("rate", &self.rate)
            .finish()
    }
}

impl Player for SimulatedPlayer {
    fn load_video_by_id(&mut self, video_id: &str) -> Result<(), AnnotatorError> {
        if !crate::video_id::is_valid(video_id) {
            return Err(AnnotatorError::PlayerError(format!(
                "invalid video id '{}'",
                video_id
            )));
        }

        self.video_id = Some(video_id.to_string());
        self.position = 0.0;
        self.anchor = Instant::now();
        self.notify(PlayerState::Unstarted);
        self.playing = true;
        self.notify(PlayerState::Playing);
        Ok(())
    }

    fn current_time(&self) -> f64 {
        if !self.playing {
            return self.position;
        }

        self.position + self.anchor.elapsed().as_secs_f64() * self.rate
    }

    fn seek_to(&mut self, seconds: f64) -> Result<(), AnnotatorError> {
        if !seconds.is_finite() {
            return Err(AnnotatorError::PlayerError(format!(
                "cannot seek to {}",
                seconds
            )));
        }

        self.position = seconds.max(0.0);
        self.anchor = Instant::now();
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), AnnotatorError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(AnnotatorError::PlayerError(format!(
                "unsupported playback rate {}",
                rate
            )));
        }

        self.reanchor();
        self.rate = rate;
        Ok(())
    }

    fn video_title(&self) -> Option<String> {
        let video_id = self.video_id.as_ref()?;
        self.titles.get(video_id).cloned()
    }

    fn play_video(&mut self) -> Result<(), AnnotatorError> {
        if self.video_id.is_none() {
            return Err(AnnotatorError::PlayerError("no video loaded".to_string()));
        }

        if !self.playing {
            self.anchor = Instant::now();
            self.playing = true;
        }
        self.notify(PlayerState::Playing);
        Ok(())
    }

    fn pause_video(&mut self) -> Result<(), AnnotatorError> {
        if self.playing {
            self.reanchor();
            self.playing = false;
        }
        self.notify(PlayerState::Paused);
        Ok(())
    }
}
