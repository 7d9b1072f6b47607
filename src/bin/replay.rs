use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::json;

use balance_walker_rs::gesture::Action;
use balance_walker_rs::session::{load_session, SessionStats};
use balance_walker_rs::{Pipeline, WalkerConfig};

#[derive(Parser, Debug)]
struct Args {
    /// Path to session_*.json[.gz] log
    #[arg(long, conflicts_with = "session_dir")]
    session: Option<PathBuf>,

    /// Directory of session logs to batch replay (processes session_*.json[.gz])
    #[arg(long)]
    session_dir: Option<PathBuf>,

    /// Use this config instead of the one stored in the session
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override sprint cadence threshold (Hz)
    #[arg(long)]
    sprint_freq: Option<f32>,

    /// Override walk cadence threshold (Hz)
    #[arg(long)]
    walk_freq: Option<f32>,

    /// Override sneak cadence threshold (Hz)
    #[arg(long)]
    sneak_freq: Option<f32>,

    /// Override forward/backward deadzone
    #[arg(long)]
    y_deadzone: Option<f32>,

    /// Override strafe threshold
    #[arg(long)]
    strafe_threshold: Option<f32>,

    /// Enable diagonal actions during replay (A/B testing)
    #[arg(long, default_value_t = false)]
    enable_diagonal: bool,
}

fn effective_config(stored: &WalkerConfig, args: &Args) -> anyhow::Result<WalkerConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => WalkerConfig::load(path)?,
        None => stored.clone(),
    };
    if let Some(v) = args.sprint_freq {
        config.sprint_freq_hz = v;
    }
    if let Some(v) = args.walk_freq {
        config.walk_freq_hz = v;
    }
    if let Some(v) = args.sneak_freq {
        config.sneak_freq_hz = v;
    }
    if let Some(v) = args.y_deadzone {
        config.y_deadzone = v;
    }
    if let Some(v) = args.strafe_threshold {
        config.strafe_threshold = v;
    }
    if args.enable_diagonal {
        config.diagonal_actions_enabled = true;
    }
    config.validate()?;
    Ok(config)
}

fn run_once(path: &Path, args: &Args) -> anyhow::Result<serde_json::Value> {
    let session = load_session(path)?;
    let config = effective_config(&session.config, args)?;

    let start = session
        .readings
        .first()
        .map(|r| r.timestamp)
        .unwrap_or(0.0);
    let mut pipeline = Pipeline::new(&config, start)?;
    let mut stats = SessionStats::default();

    // Histogram of cadence in 0.25 Hz buckets
    let mut cadence_histogram: BTreeMap<String, u64> = BTreeMap::new();
    let mut max_frequency = 0.0f32;
    let mut transitions = 0u64;
    let mut previous = None;

    for reading in &session.readings {
        let out = match pipeline.tick(reading) {
            Ok(out) => out,
            Err(e) if e.is_transient() => {
                stats.unavailable_ticks += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let f = out.diagnostics.frequency.frequency_hz;
        max_frequency = max_frequency.max(f);
        let bucket = format!("{:.2}", (f / 0.25).floor() * 0.25);
        *cadence_histogram.entry(bucket).or_insert(0) += 1;

        if previous.is_some_and(|p| p != out.flags) {
            transitions += 1;
        }
        previous = Some(out.flags);
        stats.record_flags(&out.flags);
    }

    let duration = match (session.readings.first(), session.readings.last()) {
        (Some(a), Some(b)) => b.timestamp - a.timestamp,
        _ => 0.0,
    };

    let active_share: BTreeMap<&str, f64> = Action::ALL
        .iter()
        .map(|a| {
            let ticks = stats.action_ticks.get(a.name()).copied().unwrap_or(0);
            let share = if stats.total_ticks > 0 {
                ticks as f64 / stats.total_ticks as f64
            } else {
                0.0
            };
            (a.name(), share)
        })
        .collect();

    Ok(json!({
        "session": path.display().to_string(),
        "readings": session.readings.len(),
        "duration_s": duration,
        "sprint_freq_hz": config.sprint_freq_hz,
        "walk_freq_hz": config.walk_freq_hz,
        "sneak_freq_hz": config.sneak_freq_hz,
        "y_deadzone": config.y_deadzone,
        "strafe_threshold": config.strafe_threshold,
        "diagonal_enabled": config.diagonal_actions_enabled,
        "ticks": stats.total_ticks,
        "unavailable_ticks": stats.unavailable_ticks,
        "flag_transitions": transitions,
        "max_frequency_hz": max_frequency,
        "action_ticks": stats.action_ticks,
        "action_share": active_share,
        "cadence_histogram": cadence_histogram,
    }))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let mut results = Vec::new();

    if let Some(dir) = args.session_dir.as_ref() {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !(name.starts_with("session_") && (name.ends_with(".json") || name.ends_with(".json.gz"))) {
                continue;
            }
            match run_once(&path, &args) {
                Ok(res) => results.push(res),
                Err(e) => log::error!("Failed {}: {}", path.display(), e),
            }
        }
    } else if let Some(session) = args.session.as_ref() {
        results.push(run_once(session, &args)?);
    } else {
        anyhow::bail!("Provide --session or --session-dir");
    }

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
