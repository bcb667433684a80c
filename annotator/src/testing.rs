use crate::error::AnnotatorError;
use crate::player::Player;
use crate::render::{Renderer, View};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PlayerLog {
    pub position: f64,
    pub title: Option<String>,
    pub loads: Vec<String>,
    pub seeks: Vec<f64>,
    pub rates: Vec<f64>,
    pub playing: bool,
}

/// Scripted player; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct FakePlayer {
    pub log: Arc<Mutex<PlayerLog>>,
}

impl FakePlayer {
    pub fn at(&self, position: f64) {
        self.log.lock().position = position;
    }

    pub fn with_title(&self, title: &str) {
        self.log.lock().title = Some(title.to_string());
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.log.lock().seeks.clone()
    }

    pub fn loads(&self) -> Vec<String> {
        self.log.lock().loads.clone()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.log.lock().rates.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.log.lock().playing
    }
}

impl Player for FakePlayer {
    fn load_video_by_id(&mut self, video_id: &str) -> Result<(), AnnotatorError> {
        let mut log = self.log.lock();
        log.loads.push(video_id.to_string());
        log.position = 0.0;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.log.lock().position
    }

    fn seek_to(&mut self, seconds: f64) -> Result<(), AnnotatorError> {
        let mut log = self.log.lock();
        log.seeks.push(seconds);
        log.position = seconds;
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), AnnotatorError> {
        self.log.lock().rates.push(rate);
        Ok(())
    }

    fn video_title(&self) -> Option<String> {
        self.log.lock().title.clone()
    }

    fn play_video(&mut self) -> Result<(), AnnotatorError> {
        self.log.lock().playing = true;
        Ok(())
    }

    fn pause_video(&mut self) -> Result<(), AnnotatorError> {
        self.log.lock().playing = false;
        Ok(())
    }
}

/// Renderer keeping every view it was handed.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub views: Arc<Mutex<Vec<View>>>,
}

impl RecordingRenderer {
    pub fn last(&self) -> Option<View> {
        self.views.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.views.lock().len()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, view: &View) {
        self.views.lock().push(view.clone());
    }
}
