use crate::command::Command;
use crate::monitor::LoopMonitor;
use crate::player::{Player, PlayerState, StateListener};
use crate::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;
use tracing::{debug, info};

/// Everything that can happen to a session.
#[derive(Debug)]
pub enum Event {
    Command(Command),
    /// Loop-monitor tick of the given monitor generation
    Tick { generation: u64 },
    /// Settle delay after loading `video_id` elapsed
    TitleSettled { video_id: String },
    Player(PlayerState),
}

/// Owns the session and applies events to it one at a time.
#[derive(Debug)]
pub struct Controller {
    session: Session,
    events: UnboundedSender<Event>,
    inbox: UnboundedReceiver<Event>,
    monitor: LoopMonitor,
    settle_delay: Duration,
}

impl Controller {
    pub fn new(session: Session, loop_period: Duration, settle_delay: Duration) -> Self {
        let (events, inbox) = mpsc::unbounded_channel();
        Self {
            session,
            events,
            inbox,
            monitor: LoopMonitor::new(loop_period),
            settle_delay,
        }
    }

    /// Sender for feeding events into the controller.
    pub fn sender(&self) -> UnboundedSender<Event> {
        self.events.clone()
    }

    /// Listener forwarding player state changes into the controller.
    pub fn player_listener(&self) -> StateListener {
        let events = self.events.clone();
        Box::new(move |state| {
            let _ = events.send(Event::Player(state));
        })
    }

    pub fn attach_player(&mut self, player: Box<dyn Player>) {
        self.session.attach_player(player);
    }

    /// Load `video_id` before any command arrives.
    pub fn cue(&mut self, video_id: &str) {
        if self.session.load_video_id(video_id) {
            self.schedule_settle(video_id.to_string());
        }
    }

    /// Process events until `quit` or a shutdown notification, then hand
    /// the session back.
    pub async fn run(mut self, shutdown: Arc<Notify>) -> Session {
        info!("Session controller started");
        self.session.render();

        loop {
            let event = tokio::select! {
                event = self.inbox.recv() => event,
                _ = shutdown.notified() => {
                    info!("Shutdown requested");
                    break;
                }
            };

            let Some(event) = event else {
                break;
            };

            if !self.handle(event) {
                break;
            }
        }

        self.monitor.stop();
        info!("Session controller stopped");
        self.session
    }

    fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::Command(Command::Quit) => return false,
            Event::Command(command) => self.apply(command),
            Event::Tick { generation } => {
                if self.monitor.is_current(generation) && self.session.loop_enabled() {
                    self.session.loop_tick();
                } else {
                    debug!("Dropping stale tick of generation {}", generation);
                }
            }
            Event::TitleSettled { video_id } => {
                self.session.title_settled(&video_id);
            }
            Event::Player(state) => self.session.on_player_state(state),
        }

        true
    }

    fn apply(&mut self, command: Command) {
        debug!("Command: {:?}", command);
        match command {
            Command::Load(url) => {
                if let Some(video_id) = self.session.load_video(&url) {
                    self.schedule_settle(video_id);
                }
            }
            Command::Open(video_id) => {
                self.session.load_saved_video(&video_id);
            }
            Command::SetStart => self.session.set_start(),
            Command::SetEnd => self.session.set_end(),
            Command::ClearA => self.session.clear_a(),
            Command::ClearB => self.session.clear_b(),
            Command::JumpA => self.session.jump_a(),
            Command::JumpB => self.session.jump_b(),
            Command::ToggleLoop => {
                if self.session.toggle_loop() {
                    self.monitor.start(self.events.clone());
                } else {
                    self.monitor.stop();
                }
            }
            Command::AddBreakpoint => self.session.add_breakpoint(),
            Command::SetBreakpointTime(id) => self.session.set_breakpoint_time(&id),
            Command::JumpToBreakpoint(id) => self.session.jump_to_breakpoint(&id),
            Command::Rename { id, name } => self.session.rename_breakpoint(&id, name.as_deref()),
            Command::Delete(id) => self.session.delete_breakpoint(&id),
            Command::Speed(rate) => self.session.set_speed(rate),
            Command::Play => self.session.play(),
            Command::Pause => self.session.pause(),
            Command::Show => self.session.render(),
            Command::Quit => {}
        }
    }

    fn schedule_settle(&self, video_id: String) {
        let events = self.events.clone();
        let delay = self.settle_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::TitleSettled { video_id });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jar::MemoryJar;
    use crate::library::Library;
    use crate::testing::{FakePlayer, RecordingRenderer};

    const VIDEO: &str = "dQw4w9WgXcQ";

    fn controller() -> (Controller, FakePlayer) {
        let player = FakePlayer::default();
        let session = Session::new(
            Library::new("jazzTranscriber".to_string(), Duration::from_secs(60)),
            Box::new(MemoryJar::new()),
            Box::new(RecordingRenderer::default()),
        );
        let mut controller =
            Controller::new(session, Duration::from_millis(100), Duration::from_secs(1));
        controller.attach_player(Box::new(player.clone()));
        (controller, player)
    }

    fn send(events: &UnboundedSender<Event>, command: Command) {
        events.send(Event::Command(command)).unwrap();
    }

    async fn step() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn title_is_captured_after_settle_delay() {
        let (controller, player) = controller();
        player.with_title("Song");
        let events = controller.sender();
        let task = tokio::spawn(controller.run(Arc::new(Notify::new())));

        send(&events, Command::Load(format!("https://youtu.be/{}", VIDEO)));
        step().await;
        send(&events, Command::Show);
        step().await;

        tokio::time::sleep(Duration::from_millis(1100)).await;
        send(&events, Command::Quit);
        let session = task.await.unwrap();

        assert_eq!(session.library().get(VIDEO).unwrap().title, "Song");
    }

    #[tokio::test(start_paused = true)]
    async fn loop_monitor_snaps_back_until_disabled() {
        let (controller, player) = controller();
        let events = controller.sender();
        let task = tokio::spawn(controller.run(Arc::new(Notify::new())));

        send(&events, Command::Load(format!("https://youtu.be/{}", VIDEO)));
        step().await;
        player.at(10.0);
        send(&events, Command::SetStart);
        step().await;
        player.at(20.0);
        send(&events, Command::SetEnd);
        step().await;
        player.at(15.0);
        send(&events, Command::ToggleLoop);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(player.seeks().is_empty());

        player.at(25.0);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(player.seeks(), vec![10.0]);

        send(&events, Command::ToggleLoop);
        step().await;
        player.at(30.0);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(player.seeks(), vec![10.0]);

        send(&events, Command::Quit);
        let session = task.await.unwrap();
        assert!(!session.loop_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn queued_tick_after_disable_never_runs() {
        let (mut controller, player) = controller();
        controller.handle(Event::Command(Command::Load(format!(
            "https://youtu.be/{}",
            VIDEO
        ))));
        player.at(10.0);
        controller.handle(Event::Command(Command::SetStart));
        player.at(20.0);
        controller.handle(Event::Command(Command::SetEnd));
        player.at(30.0);

        controller.handle(Event::Command(Command::ToggleLoop));
        let first = controller.monitor.generation();
        controller.handle(Event::Command(Command::ToggleLoop));
        controller.handle(Event::Tick { generation: first });
        assert!(player.seeks().is_empty());

        controller.handle(Event::Command(Command::ToggleLoop));
        let second = controller.monitor.generation();
        controller.handle(Event::Tick { generation: first });
        assert!(player.seeks().is_empty());

        controller.handle(Event::Tick { generation: second });
        assert_eq!(player.seeks(), vec![10.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_settle_does_not_touch_new_video() {
        let (mut controller, player) = controller();
        player.with_title("Old");
        controller.handle(Event::Command(Command::Load(
            "https://youtu.be/aaaaaaaaaaa".to_string(),
        )));
        controller.handle(Event::Command(Command::Load(format!(
            "https://youtu.be/{}",
            VIDEO
        ))));
        controller.handle(Event::TitleSettled {
            video_id: "aaaaaaaaaaa".to_string(),
        });

        assert!(controller.session.library().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn playing_event_fills_missing_title() {
        let (mut controller, player) = controller();
        player.with_title("Song");
        controller.cue(VIDEO);
        assert!(controller.session.library().get(VIDEO).is_none());

        let listener = controller.player_listener();
        listener(PlayerState::Playing);
        let event = controller.inbox.recv().await.unwrap();
        assert!(controller.handle(event));

        assert_eq!(controller.session.library().get(VIDEO).unwrap().title, "Song");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_notification_stops_the_loop() {
        let (controller, _player) = controller();
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(controller.run(shutdown.clone()));

        shutdown.notify_one();
        let session = task.await.unwrap();
        assert_eq!(session.video_id(), None);
    }
}
