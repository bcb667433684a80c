use crate::jar::CookieJar;
use crate::library::Library;
use crate::model::{self, Breakpoint, Markers};
use crate::player::{Player, PlayerState};
use crate::render::{format_time, BreakpointRow, GalleryItem, RateControl, Renderer, View};
use crate::video_id;
use tracing::{debug, error, info, warn};

/// State of one annotation session: the active video, its A/B markers and
/// breakpoints, and the loop flag.
///
/// Every operation is a no-op when what it needs is missing (player, active
/// video, breakpoint). Mutations of the breakpoint list are written back to
/// the library and the jar right away; every change re-renders.
pub struct Session {
    player: Option<Box<dyn Player>>,
    jar: Box<dyn CookieJar>,
    renderer: Box<dyn Renderer>,
    library: Library,
    video_id: Option<String>,
    markers: Markers,
    breakpoints: Vec<Breakpoint>,
    loop_enabled: bool,
    next_number: u64,
    rates: Vec<f64>,
    rate: f64,
}

impl Session {
    pub fn new(library: Library, jar: Box<dyn CookieJar>, renderer: Box<dyn Renderer>) -> Self {
        Self {
            player: None,
            jar,
            renderer,
            library,
            video_id: None,
            markers: Markers::default(),
            breakpoints: Vec::new(),
            loop_enabled: false,
            next_number: 1,
            rates: Vec::new(),
            rate: 1.0,
        }
    }

    /// Playback rates offered as controls.
    pub fn with_rates(mut self, rates: Vec<f64>) -> Self {
        self.rates = rates;
        self
    }

    pub fn attach_player(&mut self, player: Box<dyn Player>) {
        self.player = Some(player);
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    pub fn markers(&self) -> Markers {
        self.markers
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Load the video a sharing URL points to.
    ///
    /// Returns the activated video id; the caller schedules the title
    /// capture with [`Session::title_settled`].
    pub fn load_video(&mut self, url: &str) -> Option<String> {
        let Some(video_id) = video_id::extract(url) else {
            debug!("No video id in '{}'", url);
            return None;
        };

        if !self.activate(&video_id) {
            return None;
        }
        Some(video_id)
    }

    /// Load a video by id, restoring its record when one exists.
    pub fn load_video_id(&mut self, video_id: &str) -> bool {
        if !video_id::is_valid(video_id) {
            debug!("Invalid video id '{}'", video_id);
            return false;
        }

        self.activate(video_id)
    }

    /// Load a previously visited video.
    pub fn load_saved_video(&mut self, video_id: &str) -> bool {
        if !self.library.contains(video_id) {
            debug!("Video {} is not stored", video_id);
            return false;
        }

        self.activate(video_id)
    }

    fn activate(&mut self, video_id: &str) -> bool {
        let Some(player) = self.player.as_mut() else {
            debug!("No player to load {}", video_id);
            return false;
        };

        if let Err(e) = player.load_video_by_id(video_id) {
            warn!("Load video {}: {}", video_id, e);
            return false;
        }

        self.video_id = Some(video_id.to_string());
        self.markers = Markers::default();
        match self.library.get(video_id) {
            Some(record) => {
                self.breakpoints = record.breakpoints.clone();
                self.next_number = model::next_number(&self.breakpoints);
            }
            None => self.breakpoints.clear(),
        }

        info!(
            "Loaded video {} with {} breakpoints",
            video_id,
            self.breakpoints.len()
        );
        self.render();
        true
    }

    /// The player had time to settle after loading `video_id`: capture the
    /// title and upsert the record.
    pub fn title_settled(&mut self, video_id: &str) -> bool {
        if self.video_id.as_deref() != Some(video_id) {
            debug!("Ignoring settle of {}, no longer active", video_id);
            return false;
        }

        self.cache_title();
        true
    }

    pub fn on_player_state(&mut self, state: PlayerState) {
        if state != PlayerState::Playing {
            return;
        }

        let Some(video_id) = self.video_id.as_deref() else {
            return;
        };

        let uncached = self
            .library
            .get(video_id)
            .map_or(true, |record| record.title.is_empty());
        if uncached {
            self.cache_title();
        }
    }

    fn cache_title(&mut self) {
        let Some(video_id) = self.video_id.as_deref() else {
            return;
        };

        let title = self.player.as_ref().and_then(|player| player.video_title());
        let record = self.library.entry(video_id);
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            debug!("Caching title of {}: {}", video_id, title);
            record.title = title;
        }

        if let Err(e) = self.library.persist(self.jar.as_mut(), video_id) {
            error!("Saving video {}: {}", video_id, e);
        }
        self.render();
    }

    pub fn set_start(&mut self) {
        if let Some(time) = self.position() {
            self.markers.start = time;
            self.render();
        }
    }

    pub fn set_end(&mut self) {
        if let Some(time) = self.position() {
            self.markers.end = time;
            self.render();
        }
    }

    pub fn clear_a(&mut self) {
        self.markers.start = 0.0;
        self.render();
    }

    pub fn clear_b(&mut self) {
        self.markers.end = 0.0;
        self.render();
    }

    pub fn jump_a(&mut self) {
        self.seek(self.markers.start);
    }

    pub fn jump_b(&mut self) {
        self.seek(self.markers.end);
    }

    /// Flip the loop flag and return the new state.
    pub fn toggle_loop(&mut self) -> bool {
        self.loop_enabled = !self.loop_enabled;
        info!(
            "Loop {}",
            if self.loop_enabled { "enabled" } else { "disabled" }
        );
        self.render();
        self.loop_enabled
    }

    /// One loop-monitor check: seek back to A when playback left `[A, B)`.
    ///
    /// Returns whether a seek was issued.
    pub fn loop_tick(&mut self) -> bool {
        if !self.loop_enabled {
            return false;
        }

        let Some((start, end)) = self.markers.region() else {
            return false;
        };

        let Some(player) = self.player.as_mut() else {
            return false;
        };

        let time = player.current_time();
        if time >= start && time < end {
            return false;
        }

        debug!("Position {:.2} outside [{:.2}, {:.2}), looping", time, start, end);
        if let Err(e) = player.seek_to(start) {
            warn!("Loop seek: {}", e);
            return false;
        }
        true
    }

    pub fn add_breakpoint(&mut self) {
        if self.video_id.is_none() {
            debug!("No active video for a breakpoint");
            return;
        }

        let Some(time) = self.position() else {
            return;
        };

        let Some(following) = self.next_number.checked_add(1) else {
            warn!("Breakpoint ids exhausted for video {:?}", self.video_id);
            return;
        };

        let bp = Breakpoint::numbered(self.next_number, time);
        self.next_number = following;
        info!("Added breakpoint {} at {}", bp.id, format_time(time));
        self.breakpoints.push(bp);
        self.commit();
    }

    pub fn set_breakpoint_time(&mut self, id: &str) {
        let Some(time) = self.position() else {
            return;
        };

        let Some(bp) = self.breakpoints.iter_mut().find(|bp| bp.id == id) else {
            debug!("Breakpoint {} not found", id);
            return;
        };

        bp.time = time;
        self.commit();
    }

    pub fn jump_to_breakpoint(&mut self, id: &str) {
        let Some(time) = self.breakpoints.iter().find(|bp| bp.id == id).map(|bp| bp.time) else {
            debug!("Breakpoint {} not found", id);
            return;
        };

        self.seek(time);
    }

    /// Rename a breakpoint with the answer to the rename prompt; `None`
    /// means the prompt was cancelled.
    pub fn rename_breakpoint(&mut self, id: &str, input: Option<&str>) {
        let Some(name) = input.map(str::trim).filter(|name| !name.is_empty()) else {
            return;
        };

        let Some(bp) = self.breakpoints.iter_mut().find(|bp| bp.id == id) else {
            debug!("Breakpoint {} not found", id);
            return;
        };

        bp.name = name.to_string();
        self.commit();
    }

    pub fn delete_breakpoint(&mut self, id: &str) {
        let before = self.breakpoints.len();
        self.breakpoints.retain(|bp| bp.id != id);
        if self.breakpoints.len() == before {
            debug!("Breakpoint {} not found", id);
            return;
        }

        info!("Deleted breakpoint {}", id);
        self.commit();
    }

    pub fn set_speed(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            debug!("Ignoring playback rate {}", rate);
            return;
        }

        let Some(player) = self.player.as_mut() else {
            return;
        };

        if let Err(e) = player.set_playback_rate(rate) {
            warn!("Set playback rate: {}", e);
            return;
        }

        self.rate = rate;
        self.render();
    }

    pub fn play(&mut self) {
        if let Some(player) = self.player.as_mut() {
            if let Err(e) = player.play_video() {
                warn!("Play: {}", e);
            }
        }
    }

    pub fn pause(&mut self) {
        if let Some(player) = self.player.as_mut() {
            if let Err(e) = player.pause_video() {
                warn!("Pause: {}", e);
            }
        }
    }

    pub fn view(&self) -> View {
        let active = self.video_id.as_deref();
        View {
            video_id: self.video_id.clone(),
            title: active
                .and_then(|id| self.library.get(id))
                .map(|record| record.title.clone()),
            start: format_time(self.markers.start),
            end: format_time(self.markers.end),
            loop_enabled: self.loop_enabled,
            rows: self
                .breakpoints
                .iter()
                .map(|bp| BreakpointRow {
                    id: bp.id.clone(),
                    name: bp.name.clone(),
                    time: format_time(bp.time),
                })
                .collect(),
            rates: self
                .rates
                .iter()
                .map(|&rate| RateControl {
                    rate,
                    active: (rate - self.rate).abs() < f64::EPSILON,
                })
                .collect(),
            gallery: self
                .library
                .records()
                .map(|record| GalleryItem {
                    video_id: record.video_id.clone(),
                    title: record.title.clone(),
                    active: active == Some(record.video_id.as_str()),
                })
                .collect(),
        }
    }

    pub fn render(&mut self) {
        let view = self.view();
        self.renderer.render(&view);
    }

    fn position(&self) -> Option<f64> {
        self.player.as_ref().map(|player| player.current_time())
    }

    fn seek(&mut self, time: f64) {
        let Some(player) = self.player.as_mut() else {
            return;
        };

        if let Err(e) = player.seek_to(time) {
            warn!("Seek to {}: {}", time, e);
        }
    }

    /// Write the live breakpoints back into the active record, save it and
    /// re-render.
    fn commit(&mut self) {
        if let Some(video_id) = self.video_id.as_deref() {
            self.library.store_breakpoints(video_id, &self.breakpoints);
            if let Err(e) = self.library.persist(self.jar.as_mut(), video_id) {
                error!("Saving video {}: {}", video_id, e);
            }
        }

        self.render();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("video_id", &self.video_id)
            .field("markers", &self.markers)
            .field("breakpoints", &self.breakpoints)
            .field("loop_enabled", &self.loop_enabled)
            .field("rate", &self.rate)
            .finish()
    }
}
