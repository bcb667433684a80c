use annotator::command::Command;
use annotator::config::Settings;
use annotator::controller::{Controller, Event};
use annotator::error::AnnotatorError;
use annotator::jar::{CookieJar, FileJar, MemoryJar};
use annotator::library::Library;
use annotator::player::SimulatedPlayer;
use annotator::render::TextRenderer;
use annotator::session::Session;
use clap::Parser as ClapParser;
use std::io::ErrorKind;
use std::sync::Arc;
use std::{fs, process};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Notify;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

#[derive(ClapParser, Debug)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = "annotator.toml")]
    config: String,
}

fn main() {
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::Layer::default()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_names(false)
                .with_ansi(true)
                .with_line_number(false)
                .with_file(false)
                .with_thread_ids(false),
        );
    tracing::subscriber::set_global_default(subscriber)
        .expect("Unable to set a global logger instance");

    let cli = Cli::parse();
    let settings = match build_settings(cli.config.as_str()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let runtime = match common::runtime::build(settings.runtime.threads) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create runtime: {}", e);
            process::exit(1);
        }
    };

    runtime.block_on(run(settings));
    info!("done");
}

pub async fn run(settings: Settings) {
    let jar = open_jar(&settings.storage.path);
    let library = Library::load(
        &*jar,
        settings.storage.prefix.clone(),
        settings.storage.max_age,
    );

    let session = Session::new(library, jar, Box::new(TextRenderer::stdout()))
        .with_rates(settings.player.rates.clone());
    let mut controller = Controller::new(
        session,
        settings.loop_monitor.period,
        settings.player.settle_delay,
    );
    let player = SimulatedPlayer::new(settings.player.titles.clone())
        .on_state_change(controller.player_listener());
    controller.attach_player(Box::new(player));

    if let Some(video_id) = settings.player.default_video.as_deref() {
        controller.cue(video_id);
    }

    let shutdown = Arc::new(Notify::new());
    common::signal::run(shutdown.clone());
    tokio::spawn(read_commands(controller.sender()));

    let session = controller.run(shutdown).await;
    info!("Tracked videos: {}", session.library().len());
}

/// Forward stdin lines to the controller as commands.
async fn read_commands(events: UnboundedSender<Event>) {
    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Reading input: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match Command::parse(&line) {
            Ok(command) => {
                if events.send(Event::Command(command)).is_err() {
                    return;
                }
            }
            Err(e) => warn!("Invalid command: {}", e),
        }
    }

    let _ = events.send(Event::Command(Command::Quit));
}

fn open_jar(path: &str) -> Box<dyn CookieJar> {
    match FileJar::open(path) {
        Ok(jar) => Box::new(jar),
        Err(e) => {
            warn!("{}; keeping videos in memory only", e);
            Box::new(MemoryJar::new())
        }
    }
}

fn build_settings(config_path: &str) -> Result<Settings, AnnotatorError> {
    let data = match fs::read_to_string(config_path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("Config file '{}' does not exist, using defaults", config_path);
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(AnnotatorError::ConfigError(format!(
                "Config file '{}' is unreadable: {}",
                config_path, e
            )));
        }
    };

    toml::from_str(&data)
        .map_err(|e| AnnotatorError::ConfigError(format!("Invalid configuration: {}", e)))
}
