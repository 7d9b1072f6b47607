use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};

use balance_walker_rs::live_status::LiveStatus;
use balance_walker_rs::rerun_logger::RerunLogger;
use balance_walker_rs::sensors::{self, ReplayBoard, SimulatedBoard};
use balance_walker_rs::session::{load_session, SessionRecorder};
use balance_walker_rs::sinks::{ActionDispatcher, JoystickSink, LogActionSink, LogJoystickSink};
use balance_walker_rs::types::current_timestamp;
use balance_walker_rs::{AxisValues, BoardReading, Pipeline, WalkerConfig};

#[derive(Parser, Debug)]
#[command(name = "balance_walker")]
#[command(about = "Balance board waddle-to-locomotion controller", long_about = None)]
struct Args {
    /// Duration in seconds (0 = continuous)
    #[arg(value_name = "SECONDS", default_value = "0")]
    duration: u64,

    /// JSON config file (defaults used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sample source (sim, replay)
    #[arg(long, default_value = "sim")]
    source: String,

    /// Session log to feed in real time when --source replay
    #[arg(long)]
    replay_file: Option<PathBuf>,

    /// Simulated lateral sway frequency (Hz)
    #[arg(long, default_value = "1.0")]
    sway_hz: f64,

    /// Simulated forward lean (kg per corner, negative leans back)
    #[arg(long, default_value = "3.0")]
    lean_kg: f64,

    /// Simulated user steps off the board after this many seconds
    #[arg(long)]
    step_off: Option<f64>,

    /// Enable joystick axis output
    #[arg(long)]
    joystick: bool,

    /// Compute actions but do not send them
    #[arg(long)]
    disable_actions: bool,

    /// Output directory
    #[arg(long, default_value = "walker_sessions")]
    output_dir: String,

    /// Also record diagnostics to a Rerun .rrd file
    #[arg(long)]
    rerun: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WalkerConfig::load(path)?,
        None => WalkerConfig::default(),
    };
    if args.joystick {
        config.joystick_enabled = true;
    }
    if args.disable_actions {
        config.actions_enabled = false;
    }
    config.validate()?;

    println!("[{}] Balance Walker Starting", ts_now());
    println!("  Duration: {} seconds (0=continuous)", args.duration);
    println!("  Source: {}", args.source);
    println!("  Tick: {} ms", config.tick_interval_ms);
    println!(
        "  Cadence: sprint ≥ {} Hz | walk ≥ {} Hz | sneak ≥ {} Hz",
        config.sprint_freq_hz, config.walk_freq_hz, config.sneak_freq_hz
    );
    println!("  Actions: {}", if config.actions_enabled { "on" } else { "DISABLED" });
    println!("  Joystick: {}", if config.joystick_enabled { "on" } else { "off" });
    println!("  Output Dir: {}", args.output_dir);
    println!("  Commands: c = set center, r = reset samples, q = quit");

    std::fs::create_dir_all(&args.output_dir)?;

    let tick_interval = Duration::from_secs_f64(config.tick_interval_ms as f64 / 1000.0);
    let (board_tx, board_rx) = watch::channel::<Option<BoardReading>>(None);

    let board_handle = match args.source.as_str() {
        "sim" => {
            let mut board = SimulatedBoard::new(args.sway_hz, args.lean_kg);
            if let Some(seconds) = args.step_off {
                board = board.with_step_off(seconds);
            }
            tokio::spawn(sensors::board_loop(board, board_tx, tick_interval / 2))
        }
        "replay" => {
            let path = args
                .replay_file
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--source replay needs --replay-file"))?;
            let session = load_session(path)?;
            println!("[{}] Replaying {} readings from {}", ts_now(), session.readings.len(), path.display());
            tokio::spawn(sensors::board_loop(
                ReplayBoard::new(session.readings),
                board_tx,
                tick_interval,
            ))
        }
        other => anyhow::bail!("Unknown source '{}' (expected sim or replay)", other),
    };

    let start = current_timestamp();
    let mut pipeline = Pipeline::new(&config, start)?;
    let mut dispatcher = ActionDispatcher::new(LogActionSink::new(), config.actions_enabled);
    let mut joystick = LogJoystickSink::new();
    let mut recorder = SessionRecorder::new(&args.output_dir, &config)?;
    let rerun = match &args.rerun {
        Some(path) => Some(RerunLogger::new(path)?),
        None => None,
    };

    let mut live_status = LiveStatus::new();
    live_status.actions_enabled = config.actions_enabled;
    live_status.joystick_enabled = config.joystick_enabled;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started_at = Utc::now();
    let mut last_save = Utc::now();
    let mut last_status_update = Utc::now();
    let mut device_available = true;
    let mut stdin_open = true;
    let mut fatal: Option<anyhow::Error> = None;

    println!("[{}] Starting tick loop...", ts_now());

    loop {
        tokio::select! {
            line = stdin.next_line(), if stdin_open => {
                match line {
                    Ok(Some(cmd)) => match cmd.trim() {
                        "c" => {
                            pipeline.request_center_offset();
                            recorder.stats_mut().center_offset_commands += 1;
                            println!("[{}] Center offset requested", ts_now());
                        }
                        "r" => {
                            pipeline.reset_samples();
                            println!("[{}] Sample window cleared", ts_now());
                        }
                        "q" => {
                            println!("[{}] Quit requested", ts_now());
                            break;
                        }
                        "" => {}
                        other => log::warn!("Unknown command '{}'", other),
                    },
                    // stdin closed; keep ticking until duration/source ends
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        log::warn!("stdin read failed: {}", e);
                        stdin_open = false;
                    }
                }
            }
            _ = ticker.tick() => {
                if args.duration > 0 {
                    let elapsed = Utc::now().signed_duration_since(started_at);
                    if elapsed.num_seconds() as u64 >= args.duration {
                        println!("[{}] Duration reached, stopping...", ts_now());
                        break;
                    }
                }

                if board_handle.is_finished() {
                    println!("[{}] Board source ended", ts_now());
                    break;
                }
                let latest = board_rx.borrow().clone();
                let Some(mut reading) = latest else {
                    continue;
                };

                // Stamp with tick time: the jump timer runs on the tick clock
                reading.timestamp = current_timestamp();
                recorder.record_reading(&reading);

                match pipeline.tick(&reading) {
                    Ok(out) => {
                        if !device_available {
                            log::info!("Balance board available again");
                            device_available = true;
                        }

                        let report = dispatcher.dispatch(&out.flags);
                        for failure in &report.failures {
                            log::warn!("{}", failure);
                        }

                        if let Some(axes) = out.axes {
                            if let Err(e) = joystick.set_axes(axes) {
                                log::warn!("{}", e);
                                recorder.stats_mut().sink_failures += 1;
                            }
                            live_status.joystick_x = axes.x;
                            live_status.joystick_y = axes.y;
                        }

                        if let Some(rec) = rerun.as_ref() {
                            rec.set_time(reading.timestamp - start);
                            rec.log_diagnostics(&out.diagnostics);
                            rec.log_actions(&out.flags);
                        }

                        let stats = recorder.stats_mut();
                        stats.sink_failures += report.failures.len() as u64;
                        stats.record_flags(&out.flags);

                        live_status.actions = out.flags;
                        live_status.summary = out.flags.describe();
                        live_status.diagnostics = Some(out.diagnostics);
                    }
                    Err(e) if e.is_transient() => {
                        if device_available {
                            log::warn!("{}", e);
                            device_available = false;
                            // Nothing may stay held while the board is gone
                            dispatcher.release_all();
                        }
                        recorder.stats_mut().unavailable_ticks += 1;
                    }
                    Err(e) => {
                        fatal = Some(e.into());
                        break;
                    }
                }

                let now = Utc::now();
                if now.signed_duration_since(last_status_update).num_seconds() >= 2 {
                    live_status.timestamp = current_timestamp();
                    live_status.uptime_seconds = now.signed_duration_since(started_at).num_seconds().max(0) as u64;
                    live_status.device_available = device_available;
                    live_status.apply_stats(recorder.stats());

                    let status_path = format!("{}/live_status.json", args.output_dir);
                    if let Err(e) = live_status.save(&status_path) {
                        log::warn!("Failed to write live status: {}", e);
                    }
                    last_status_update = now;
                }

                if now.signed_duration_since(last_save).num_seconds() >= 15 {
                    match recorder.save() {
                        Ok(path) => println!("[{}] Auto-saved {} readings to {}", ts_now(), recorder.reading_count(), path.display()),
                        Err(e) => {
                            log::warn!("Auto-save failed: {}", e);
                            recorder.stats_mut().save_failures += 1;
                        }
                    }
                    last_save = now;
                }
            }
        }
    }

    let release = dispatcher.release_all();
    for failure in &release.failures {
        log::warn!("{}", failure);
    }
    if config.joystick_enabled {
        let _ = joystick.set_axes(AxisValues::CENTERED);
    }
    board_handle.abort();

    match recorder.save() {
        Ok(path) => println!("[{}] Final save: {} readings to {}", ts_now(), recorder.reading_count(), path.display()),
        Err(e) => {
            log::error!("Final save failed: {}", e);
            recorder.stats_mut().save_failures += 1;
        }
    }

    live_status.apply_stats(recorder.stats());
    let status_path = format!("{}/live_status_final.json", args.output_dir);
    let _ = live_status.save(&status_path);

    let stats = recorder.stats();
    println!("\n=== Final Stats ===");
    println!("Ticks: {}", stats.total_ticks);
    println!("Unavailable ticks: {}", stats.unavailable_ticks);
    println!("Sink failures: {}", stats.sink_failures);
    println!("Save failures: {}", stats.save_failures);
    for (action, ticks) in &stats.action_ticks {
        println!("  {:<15} {} ticks", action, ticks);
    }

    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
