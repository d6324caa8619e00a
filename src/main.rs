use chrono::Local;
use sermon_stream::audio::{probe_stream, HttpBackend, PlaybackError};
use sermon_stream::catalog::{load_from, source_for, Catalog, SermonRecord};
use sermon_stream::config::Settings;
use sermon_stream::init_app_dirs;
use sermon_stream::liturgical;
use sermon_stream::session::{AudioSession, PlaybackState, SessionError, SessionHandle, SessionOptions};
use sermon_stream::ui::{parse_control, Cli, Command, Control};
use std::error::Error;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const LOG_TARGET: &str = "sermon_stream::main";

fn init_tracing(default_filter: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::new();
    if let Err(e) = run(&cli).await {
        cli.display_error(e.as_ref());
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let args = &cli.args;

    init_app_dirs()?;

    let config_path = match &args.config {
        Some(path) => PathBuf::from(path),
        None => Settings::default_path(),
    };
    let mut settings = Settings::load(&config_path)?;

    // Command-line (and env) values win over the config file
    if let Some(catalog) = &args.catalog {
        settings.catalog_source = catalog.clone();
    }
    if let Some(base) = &args.audio_base_url {
        settings.audio_base_url = Some(base.clone());
    }
    settings.validate()?;

    init_tracing(&settings.log_filter, args.log_json);
    debug!(target: LOG_TARGET, config = %config_path.display(), "Settings loaded");

    let source = source_for(&settings.catalog_source);
    let catalog = load_from(source.as_ref())
        .await?
        .with_audio_base(settings.audio_base_url.as_deref())?;

    match &args.command {
        Command::List { category: None } => cli.display_categories(catalog.categories()),
        Command::List { category: Some(key) } => {
            let sermons: Vec<&SermonRecord> = catalog.in_category(key).collect();
            if sermons.is_empty() {
                return Err(format!("No sermons in category '{}'", key).into());
            }
            cli.display_sermons(&sermons);
        }
        Command::Series => cli.display_series(&catalog.series_by_size()),
        Command::Sunday { date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            cli.display_pick(&liturgical::sunday_pick(catalog.records(), today));
            cli.display_pick(&liturgical::next_sunday_pick(catalog.records(), today));
        }
        Command::Upcoming { count, date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            cli.display_sermons(&liturgical::upcoming(catalog.records(), today, *count));
        }
        Command::Related { id } => {
            let target = find(&catalog, id)?;
            cli.display_sermons(&liturgical::related_sermons(catalog.records(), target));
        }
        Command::Probe { id } => {
            let record = playable(&catalog, id)?;
            let client = reqwest::Client::new();
            let report = probe_stream(&client, &record.audio_url, settings.probe_bytes).await?;
            cli.display_probe(&report, record);
            if let Err(e) = report.verify_range_contract() {
                warn!(target: LOG_TARGET, "Seeking will not work against this server: {}", e);
            }
        }
        Command::Play { id, seconds } => {
            let record = playable(&catalog, id)?.clone();
            play(cli, &settings, record, *seconds).await?;
        }
    }

    Ok(())
}

fn find<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a SermonRecord, Box<dyn Error>> {
    catalog.find(id).ok_or_else(|| format!("Unknown sermon '{}'", id).into())
}

fn playable<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a SermonRecord, Box<dyn Error>> {
    let record = find(catalog, id)?;
    if !record.is_playable() {
        return Err(format!("Sermon '{}' has no audio file", id).into());
    }
    Ok(record)
}

/// Streams one sermon through the session and prints its state until it ends,
/// fails, hits the time limit or the user presses Ctrl+C.
async fn play(cli: &Cli, settings: &Settings, record: SermonRecord, limit: Option<u64>) -> Result<(), Box<dyn Error>> {
    let backend = HttpBackend::new(settings.http_backend_config());
    let options = SessionOptions {
        readiness_timeout: settings.readiness_timeout(),
        initial_volume: settings.initial_volume,
        ..Default::default()
    };
    let (session, handle) = AudioSession::new(Box::new(backend), options);
    let task = session.spawn();
    let mut updates = handle.subscribe();

    info!(target: LOG_TARGET, id = %record.id, "Starting playback");
    handle.load_sermon(record).await?;

    cli.display_controls();
    let mut controls = spawn_stdin_reader();
    let mut stdin_open = true;

    let deadline = limit.map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut last_shown: Option<(PlaybackState, u64, bool)> = None;
    let mut failure: Option<PlaybackError> = None;

    loop {
        let time_limit = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                let shown = (snapshot.playback_state, snapshot.position_seconds as u64, snapshot.is_buffering);
                if last_shown != Some(shown) {
                    cli.display_status(&snapshot);
                    last_shown = Some(shown);
                }
                match snapshot.playback_state {
                    PlaybackState::Ended => break,
                    PlaybackState::Errored => {
                        failure = snapshot.last_error;
                        break;
                    }
                    _ => {}
                }
            }
            line = controls.recv(), if stdin_open => match line {
                Some(line) => match parse_control(&line) {
                    Some(Control::Quit) => {
                        handle.close_session().await?;
                        break;
                    }
                    Some(control) => apply_control(&handle, control, settings).await?,
                    None => cli.display_controls(),
                },
                // stdin closed; keep playing without controls
                None => stdin_open = false,
            },
            _ = time_limit => {
                info!(target: LOG_TARGET, "Time limit reached");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                info!(target: LOG_TARGET, "Interrupted");
                break;
            }
        }
    }

    if let Err(e) = handle.shutdown().await {
        warn!(target: LOG_TARGET, "Session already stopped: {}", e);
    }
    task.await?;

    match failure {
        Some(err) => Err(Box::new(err)),
        None => Ok(()),
    }
}

/// Reads stdin lines on a plain thread; a blocked terminal read must not hold up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn apply_control(handle: &SessionHandle, control: Control, settings: &Settings) -> Result<(), SessionError> {
    debug!(target: LOG_TARGET, ?control, "Control");
    match control {
        Control::TogglePlay if handle.snapshot().is_playing() => handle.pause().await,
        Control::TogglePlay => handle.play().await,
        Control::SkipForward => handle.skip_forward(settings.skip_forward_secs).await,
        Control::SkipBackward => handle.skip_backward(settings.skip_backward_secs).await,
        Control::Seek(seconds) => handle.seek(seconds).await,
        Control::Volume(level) => handle.set_volume(level).await,
        Control::CycleRate => handle.cycle_playback_rate().await,
        Control::Quit => handle.close_session().await,
    }
}
