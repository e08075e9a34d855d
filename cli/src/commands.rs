use std::time::Duration;

use clap::Args;
use hiit_core::{
    AppConfig, AppConfigExt, ChannelSink, CuePlayer, CueRegistry, EngineHandle, EventSink,
    NullCuePlayer, PhaseKind, Plan, RunSnapshot, RunStatus, RunnerError, Settings, TimerEngine,
    TimerEvent, build_plan, format_hmmss, format_mmss, parse_clock, spawn_engine,
};
use tokio::task::JoinHandle;

use crate::audio::{AudioDrain, RodioCuePlayer};
use crate::context::CliContext;
use crate::display::TerminalDisplay;
use crate::repl::{Control, parse_control, spawn_stdin_reader};

/// Workout settings given on the command line. Anything left out comes from
/// the named preset, else the last started workout, else the defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Prepare time (SS, MM:SS or HH:MM:SS)
    #[arg(long)]
    pub prepare: Option<String>,
    /// Exercise time per set
    #[arg(long)]
    pub exercise: Option<String>,
    /// Rest time between sets
    #[arg(long)]
    pub rest: Option<String>,
    #[arg(long)]
    pub sets: Option<u32>,
    /// Start from a saved preset
    #[arg(long)]
    pub preset: Option<String>,
}

impl SettingsArgs {
    pub fn resolve(&self, config: &AppConfig) -> Result<Settings, String> {
        let mut settings = match &self.preset {
            Some(name) => config
                .find_preset(name)
                .ok_or_else(|| format!("preset '{name}' not found"))?,
            None => config.initial_settings(),
        };

        if let Some(value) = &self.prepare {
            settings.prepare = parse_flag("prepare", value)?;
        }
        if let Some(value) = &self.exercise {
            settings.exercise = parse_flag("exercise", value)?;
        }
        if let Some(value) = &self.rest {
            settings.rest = parse_flag("rest", value)?;
        }
        if let Some(sets) = self.sets {
            settings.sets = sets;
        }
        Ok(settings.normalized())
    }
}

fn parse_flag(flag: &str, value: &str) -> Result<u32, String> {
    parse_clock(value).map_err(|e| format!("--{flag}: {e}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Run
// ─────────────────────────────────────────────────────────────────────────────

/// Longest wait for the completion sound after the run ends
const AUDIO_DRAIN_LIMIT: Duration = Duration::from_secs(5);

pub async fn run(args: &SettingsArgs, ctx: &mut CliContext) -> Result<(), String> {
    let settings = args.resolve(&ctx.config)?;
    let plan = build_plan(&settings);

    let (handle, inbox) = EngineHandle::channel();
    let audio = &ctx.config.audio;
    let registry = CueRegistry::with_assets(|kind| Some(audio.cue_file(kind).to_string()));
    let mut drain = None;
    let player: Box<dyn CuePlayer + Send> = if audio.enabled {
        let (player, audio_drain) =
            RodioCuePlayer::spawn(audio, &registry, &ctx.sounds_dir(), handle.clone());
        drain = audio_drain;
        Box::new(player)
    } else {
        Box::new(NullCuePlayer)
    };
    let (sink, mut events) = ChannelSink::channel();
    let task = spawn_engine(inbox, TimerEngine::with_registry(player, sink, registry));

    if let Err(e) = handle.start(settings).await {
        shutdown(&handle, task, drain).await;
        return Err(e.to_string());
    }
    ctx.config.remember_last_settings(settings);
    ctx.save_config();

    let mut display = TerminalDisplay::stdout(ctx.config.notifications_enabled);
    display.message(&format!(
        "{} phases, {} total. p = pause/resume, r = reset, s = restart, q = quit",
        plan.len(),
        format_hmmss(plan.total_secs())
    ));

    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break Ok(()) };
                display.handle_event(&event);
                // Without stdin nothing can restart the run
                if event == TimerEvent::Finished || (event == TimerEvent::Reset && !stdin_open) {
                    break Ok(());
                }
            }
            line = lines.recv(), if stdin_open => {
                let Some(line) = line else {
                    stdin_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_control(&line) {
                    Ok(control) => match respond(control, settings, &handle, &mut display).await {
                        Ok(true) => break Ok(()),
                        Ok(false) => {}
                        Err(e) => break Err(e.to_string()),
                    },
                    Err(e) => display.message(e.trim_end()),
                }
            }
            _ = &mut ctrl_c => {
                let _ = handle.reset().await;
                break Ok(());
            }
        }
    };

    shutdown(&handle, task, drain).await;
    result
}

/// Stop the engine task, then give the completion sound time to play out
async fn shutdown<P: CuePlayer, S: EventSink>(
    handle: &EngineHandle,
    task: JoinHandle<TimerEngine<P, S>>,
    audio: Option<AudioDrain>,
) {
    handle.shutdown();
    match task.await {
        // The audio thread winds down once the engine's player is gone
        Ok(engine) => drop(engine),
        Err(e) => tracing::error!(error = %e, "Timer engine task failed"),
    }
    if let Some(audio) = audio {
        audio.wait(AUDIO_DRAIN_LIMIT).await;
    }
}

/// Apply one control command. Returns true when the run should end.
async fn respond<W: std::io::Write>(
    control: Control,
    settings: Settings,
    handle: &EngineHandle,
    display: &mut TerminalDisplay<W>,
) -> Result<bool, RunnerError> {
    match control {
        Control::Pause => handle.toggle_pause()?,
        Control::Reset => handle.reset().await?,
        Control::Start => handle.start(settings).await?,
        Control::Status => {
            let snapshot = handle.snapshot().await?;
            display.message(&describe_snapshot(&snapshot));
        }
        Control::Quit => {
            handle.reset().await?;
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn describe_snapshot(snapshot: &RunSnapshot) -> String {
    let status = match snapshot.status {
        RunStatus::Idle => return "Idle".to_string(),
        RunStatus::Finished => return "Finished".to_string(),
        RunStatus::Running => "Running",
        RunStatus::Paused => "Paused",
    };
    let Some(phase) = snapshot.phase else {
        return status.to_string();
    };
    format!(
        "{status}: {} ({}/{}), {} left in phase, {} total, {} of {} sets to go",
        phase_label(phase.kind(), phase.set_index()),
        snapshot.phase_index.map_or(0, |i| i + 1),
        snapshot.phase_count,
        format_mmss(snapshot.remaining),
        format_hmmss(snapshot.total_remaining),
        snapshot.sets_remaining,
        snapshot.sets_planned,
    )
}

fn phase_label(kind: PhaseKind, set_index: Option<u32>) -> String {
    match set_index {
        Some(set) => format!("{kind} {set}"),
        None => kind.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plan
// ─────────────────────────────────────────────────────────────────────────────

pub fn show_plan(args: &SettingsArgs, ctx: &CliContext) -> Result<(), String> {
    let settings = args.resolve(&ctx.config)?;
    print!("{}", format_plan(&build_plan(&settings)));
    Ok(())
}

pub fn format_plan(plan: &Plan) -> String {
    if plan.is_empty() {
        return "Nothing to run: every duration is zero\n".to_string();
    }

    let mut out = format!("{:>3}  {:<12} {:>8}\n", "#", "Phase", "Time");
    for (i, phase) in plan.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<12} {:>8}\n",
            i + 1,
            phase_label(phase.kind(), phase.set_index()),
            format_mmss(phase.duration)
        ));
    }
    out.push_str(&format!(
        "Total {} in {} exercise phases\n",
        format_hmmss(plan.total_secs()),
        plan.count_of(PhaseKind::Exercise)
    ));
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Presets
// ─────────────────────────────────────────────────────────────────────────────

pub fn list_presets(ctx: &CliContext) {
    if ctx.config.presets.is_empty() {
        println!("No presets saved");
        return;
    }

    println!(
        "{:<20} {:>8} {:>8} {:>8} {:>5} {:>9}",
        "Name", "Prepare", "Exercise", "Rest", "Sets", "Total"
    );
    println!("{}", "-".repeat(63));
    for name in ctx.config.preset_names() {
        let Some(settings) = ctx.config.find_preset(&name) else {
            continue;
        };
        println!(
            "{:<20} {:>8} {:>8} {:>8} {:>5} {:>9}",
            name,
            format_mmss(settings.prepare),
            format_mmss(settings.exercise),
            format_mmss(settings.rest),
            settings.sets,
            format_hmmss(build_plan(&settings).total_secs()),
        );
    }
}

pub fn save_preset(name: &str, args: &SettingsArgs, ctx: &mut CliContext) -> Result<(), String> {
    let settings = args.resolve(&ctx.config)?;
    ctx.config
        .save_preset(name, &settings)
        .map_err(|e| e.to_string())?;
    ctx.config.save().map_err(|e| e.to_string())?;
    println!("Saved preset '{}'", name.trim());
    Ok(())
}

pub fn delete_preset(name: &str, ctx: &mut CliContext) -> Result<(), String> {
    ctx.config.delete_preset(name).map_err(|e| e.to_string())?;
    ctx.config.save().map_err(|e| e.to_string())?;
    println!("Deleted preset '{name}'");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiit_core::{CueError, CueHandle, Phase};
    use std::sync::{Arc, Mutex, mpsc};

    /// Hands the completion sound to a stand-in audio thread that takes a
    /// while to play it and only exits once the player is dropped
    struct SlowFinishPlayer {
        sounds: mpsc::Sender<&'static str>,
    }

    impl CuePlayer for SlowFinishPlayer {
        fn play_cue(&mut self, _handle: CueHandle, _kind: PhaseKind) -> Result<(), CueError> {
            Ok(())
        }

        fn stop_cue(&mut self, _handle: CueHandle) {}

        fn pause_cue(&mut self, _handle: CueHandle) {}

        fn resume_cue(&mut self, _handle: CueHandle) {}

        fn play_finish(&mut self) {
            let _ = self.sounds.send("finish");
        }
    }

    fn config_with_preset() -> AppConfig {
        let mut config = AppConfig::default();
        config
            .save_preset(
                "short",
                &Settings {
                    prepare: 5,
                    exercise: 30,
                    rest: 15,
                    sets: 4,
                },
            )
            .unwrap();
        config
    }

    #[test]
    fn resolve_falls_back_to_defaults() {
        let settings = SettingsArgs::default()
            .resolve(&AppConfig::default())
            .unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn flags_override_preset_and_last_settings() {
        let mut config = config_with_preset();
        config.remember_last_settings(Settings {
            prepare: 1,
            exercise: 2,
            rest: 3,
            sets: 4,
        });

        let args = SettingsArgs {
            exercise: Some("1:15".to_string()),
            sets: Some(0),
            preset: Some("short".to_string()),
            ..SettingsArgs::default()
        };
        let settings = args.resolve(&config).unwrap();
        assert_eq!(settings.prepare, 5);
        assert_eq!(settings.exercise, 75);
        assert_eq!(settings.rest, 15);
        assert_eq!(settings.sets, 1);

        let last = SettingsArgs::default().resolve(&config).unwrap();
        assert_eq!(last.exercise, 2);
    }

    #[test]
    fn bad_input_is_reported_with_flag_name() {
        let args = SettingsArgs {
            rest: Some("ten".to_string()),
            ..SettingsArgs::default()
        };
        let err = args.resolve(&AppConfig::default()).unwrap_err();
        assert!(err.starts_with("--rest:"), "{err}");

        let args = SettingsArgs {
            preset: Some("missing".to_string()),
            ..SettingsArgs::default()
        };
        assert_eq!(
            args.resolve(&AppConfig::default()).unwrap_err(),
            "preset 'missing' not found"
        );
    }

    #[test]
    fn plan_listing_numbers_phases_and_totals() {
        let plan = build_plan(&Settings {
            prepare: 10,
            exercise: 20,
            rest: 10,
            sets: 2,
        });
        let listing = format_plan(&plan);
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "  1  Prepare         00:10");
        assert_eq!(lines[2], "  2  Exercise 1      00:20");
        assert_eq!(lines[3], "  3  Rest 1          00:10");
        assert_eq!(lines[5], "Total 01:00 in 2 exercise phases");

        assert!(format_plan(&build_plan(&Settings::new(0, 0, 0, 3))).starts_with("Nothing"));
    }

    #[test]
    fn snapshot_description() {
        let snapshot = RunSnapshot {
            status: RunStatus::Paused,
            phase: Some(Phase {
                step: hiit_core::PhaseStep::Rest { set: 2 },
                duration: 10,
            }),
            phase_index: Some(4),
            phase_count: 8,
            remaining: 7,
            phase_total: 10,
            sets_planned: 4,
            sets_remaining: 2,
            total_remaining: 95,
            progress: 0.3,
        };
        assert_eq!(
            describe_snapshot(&snapshot),
            "Paused: Rest 2 (5/8), 00:07 left in phase, 01:35 total, 2 of 4 sets to go"
        );

        let idle = RunSnapshot {
            status: RunStatus::Idle,
            phase: None,
            phase_index: None,
            ..snapshot
        };
        assert_eq!(describe_snapshot(&idle), "Idle");
    }

    #[tokio::test]
    async fn completion_sound_plays_out_before_shutdown_returns() {
        let played = Arc::new(Mutex::new(Vec::new()));
        let (sounds, queued) = mpsc::channel();
        let audio_thread = {
            let played = Arc::clone(&played);
            std::thread::spawn(move || {
                // Runs until the player is dropped, like the real audio thread
                let pending: Vec<&str> = queued.iter().collect();
                for sound in pending {
                    std::thread::sleep(Duration::from_millis(50));
                    played.lock().unwrap().push(sound);
                }
            })
        };

        let (handle, inbox) = EngineHandle::channel();
        let (sink, mut events) = ChannelSink::channel();
        let task = spawn_engine(inbox, TimerEngine::new(SlowFinishPlayer { sounds }, sink));
        handle.start(Settings::new(0, 1, 0, 1)).await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = events.recv().await {
                if event == TimerEvent::Finished {
                    break;
                }
            }
        })
        .await
        .unwrap();
        assert!(played.lock().unwrap().is_empty());

        shutdown(&handle, task, Some(AudioDrain::new(audio_thread))).await;
        assert_eq!(*played.lock().unwrap(), vec!["finish"]);
    }
}
