//! rodio-backed cue player
//!
//! All playback happens on one dedicated audio thread that owns the output
//! stream. The engine talks to it through [`RodioCuePlayer`]; the thread
//! reports cue endings, failures and measured durations back through an
//! [`EngineHandle`]. Once every player is dropped the thread lets the
//! completion sound and tones play out, then exits; [`AudioDrain`] waits
//! for that.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use hiit_core::{CueError, CueHandle, CuePlayer, CueRegistry, EngineHandle, PhaseKind, Tone};
use hiit_types::AudioSettings;
use rodio::source::SineWave;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

/// How often the audio thread checks whether the active cue has finished
const POLL_INTERVAL: Duration = Duration::from_millis(50);

const TONE_AMPLITUDE: f32 = 0.25;

enum AudioCommand {
    Play { handle: CueHandle, path: PathBuf },
    Stop(CueHandle),
    Pause(CueHandle),
    Resume(CueHandle),
    Tone(Tone),
    Finish(PathBuf),
}

/// Cue player that forwards requests to the audio thread
pub struct RodioCuePlayer {
    cmd_tx: mpsc::Sender<AudioCommand>,
    cue_paths: HashMap<PhaseKind, PathBuf>,
    finish_path: PathBuf,
    tones_enabled: bool,
}

impl RodioCuePlayer {
    /// Start the audio thread. Each kind plays the asset named in `cues`,
    /// resolved against `sounds_dir`; kinds without one have no cue. Cue
    /// durations are measured on that thread and reported to `engine` as
    /// they become known.
    pub fn spawn(
        settings: &AudioSettings,
        cues: &CueRegistry,
        sounds_dir: &Path,
        engine: EngineHandle,
    ) -> (Self, Option<AudioDrain>) {
        let cue_paths = cue_paths(cues, sounds_dir);

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let measure_paths = cue_paths.clone();
        let volume = settings.volume.min(100) as f32 / 100.0;

        let spawned = std::thread::Builder::new()
            .name("hiit-audio".to_string())
            .spawn(move || {
                measure_durations(&measure_paths, &engine);
                AudioThread::new(volume, engine).run(cmd_rx);
            });
        let drain = match spawned {
            Ok(thread) => Some(AudioDrain::new(thread)),
            Err(e) => {
                // Every cue will then fail with ServiceClosed
                tracing::warn!(error = %e, "Failed to start audio thread");
                None
            }
        };

        let player = Self {
            cmd_tx,
            cue_paths,
            finish_path: sounds_dir.join(&settings.finish_cue),
            tones_enabled: settings.tones_enabled,
        };
        (player, drain)
    }

    fn send(&self, cmd: AudioCommand) -> Result<(), CueError> {
        self.cmd_tx.send(cmd).map_err(|_| CueError::ServiceClosed)
    }
}

impl CuePlayer for RodioCuePlayer {
    fn play_cue(&mut self, handle: CueHandle, kind: PhaseKind) -> Result<(), CueError> {
        let path = self
            .cue_paths
            .get(&kind)
            .ok_or(CueError::NoAsset { kind })?;
        if !path.exists() {
            return Err(CueError::NotFound { path: path.clone() });
        }
        self.send(AudioCommand::Play {
            handle,
            path: path.clone(),
        })
    }

    fn stop_cue(&mut self, handle: CueHandle) {
        let _ = self.send(AudioCommand::Stop(handle));
    }

    fn pause_cue(&mut self, handle: CueHandle) {
        let _ = self.send(AudioCommand::Pause(handle));
    }

    fn resume_cue(&mut self, handle: CueHandle) {
        let _ = self.send(AudioCommand::Resume(handle));
    }

    fn play_tone(&mut self, tone: Tone) {
        if self.tones_enabled {
            let _ = self.send(AudioCommand::Tone(tone));
        }
    }

    fn play_finish(&mut self) {
        if self.finish_path.exists() {
            let _ = self.send(AudioCommand::Finish(self.finish_path.clone()));
        }
    }
}

/// Lets the audio thread finish what is still playing before the process
/// exits. The thread only stops once every [`RodioCuePlayer`] is dropped.
pub struct AudioDrain {
    thread: JoinHandle<()>,
}

impl AudioDrain {
    pub(crate) fn new(thread: JoinHandle<()>) -> Self {
        Self { thread }
    }

    /// Wait for the audio thread to exit, giving up after `limit`
    pub async fn wait(self, limit: Duration) {
        let deadline = tokio::time::Instant::now() + limit;
        while !self.thread.is_finished() {
            if tokio::time::Instant::now() >= deadline {
                tracing::debug!(?limit, "Audio still playing, not waiting any longer");
                return;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        if self.thread.join().is_err() {
            tracing::warn!("Audio thread panicked");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Audio Thread
// ─────────────────────────────────────────────────────────────────────────────

struct AudioThread {
    volume: f32,
    engine: EngineHandle,
    /// Kept alive for as long as anything plays
    output: Option<(OutputStream, OutputStreamHandle)>,
    active: Option<(CueHandle, Sink)>,
    /// Completion sound and tones; nothing stops these early
    lingering: Vec<Sink>,
}

impl AudioThread {
    fn new(volume: f32, engine: EngineHandle) -> Self {
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(e) => {
                tracing::warn!(error = %e, "No audio output device, cues disabled");
                None
            }
        };
        Self {
            volume,
            engine,
            output,
            active: None,
            lingering: Vec::new(),
        }
    }

    fn run(mut self, cmd_rx: mpsc::Receiver<AudioCommand>) {
        loop {
            match cmd_rx.recv_timeout(POLL_INTERVAL) {
                Ok(cmd) => self.handle(cmd),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
            self.check_finished();
        }

        self.stop_active();
        if !self.lingering.is_empty() {
            tracing::debug!(sounds = self.lingering.len(), "Letting sounds play out");
        }
        for sink in self.lingering.drain(..) {
            sink.sleep_until_end();
        }
        tracing::debug!("Audio thread stopped");
    }

    fn handle(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Play { handle, path } => {
                self.stop_active();
                match self.start(&path) {
                    Ok(sink) => self.active = Some((handle, sink)),
                    Err(e) => {
                        tracing::warn!(%handle, error = %e, "Cue playback failed");
                        let _ = self.engine.cue_failed(handle);
                    }
                }
            }
            AudioCommand::Stop(handle) => {
                if self.is_active(handle) {
                    self.stop_active();
                }
            }
            AudioCommand::Pause(handle) => {
                if let Some((active, sink)) = &self.active
                    && *active == handle
                {
                    sink.pause();
                }
            }
            AudioCommand::Resume(handle) => {
                if let Some((active, sink)) = &self.active
                    && *active == handle
                {
                    sink.play();
                }
            }
            AudioCommand::Tone(tone) => self.play_tone(tone),
            AudioCommand::Finish(path) => match self.start(&path) {
                Ok(sink) => self.lingering.push(sink),
                Err(e) => tracing::warn!(error = %e, "Failed to play completion sound"),
            },
        }
    }

    fn is_active(&self, handle: CueHandle) -> bool {
        matches!(&self.active, Some((active, _)) if *active == handle)
    }

    fn stop_active(&mut self) {
        if let Some((_, sink)) = self.active.take() {
            sink.stop();
        }
    }

    /// Report a cue that played to its end and drop spent sounds
    fn check_finished(&mut self) {
        self.lingering.retain(|sink| !sink.empty());

        let finished = matches!(&self.active, Some((_, sink)) if sink.empty());
        if finished && let Some((handle, _)) = self.active.take() {
            tracing::debug!(%handle, "Cue ended");
            let _ = self.engine.cue_ended(handle);
        }
    }

    fn new_sink(&self) -> Result<Sink, CueError> {
        let (_, stream_handle) = self
            .output
            .as_ref()
            .ok_or_else(|| CueError::OutputUnavailable("no output device".to_string()))?;
        let sink =
            Sink::try_new(stream_handle).map_err(|e| CueError::OutputUnavailable(e.to_string()))?;
        sink.set_volume(self.volume);
        Ok(sink)
    }

    fn start(&self, path: &Path) -> Result<Sink, CueError> {
        let source = open_decoder(path)?;
        let sink = self.new_sink()?;
        sink.append(source);
        Ok(sink)
    }

    fn play_tone(&mut self, tone: Tone) {
        let sink = match self.new_sink() {
            Ok(sink) => sink,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping tone");
                return;
            }
        };
        for &(freq, millis) in tone_notes(tone) {
            sink.append(
                SineWave::new(freq)
                    .take_duration(Duration::from_millis(millis))
                    .amplify(TONE_AMPLITUDE),
            );
        }
        self.lingering.push(sink);
    }
}

/// Cue file for each kind that has an asset
fn cue_paths(cues: &CueRegistry, sounds_dir: &Path) -> HashMap<PhaseKind, PathBuf> {
    PhaseKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let asset = cues.info(kind).asset.as_ref()?;
            Some((kind, sounds_dir.join(asset)))
        })
        .collect()
}

/// (frequency Hz, length ms) for each note of a tone
fn tone_notes(tone: Tone) -> &'static [(f32, u64)] {
    match tone {
        Tone::NextPhaseSoon => &[(700.0, 150), (440.0, 150)],
        Tone::PhaseEndingSoon => &[(440.0, 200)],
        Tone::CircuitComplete => &[(880.0, 150), (660.0, 150), (990.0, 300)],
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Duration Measurement
// ─────────────────────────────────────────────────────────────────────────────

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, CueError> {
    let file = File::open(path).map_err(|_| CueError::NotFound {
        path: path.to_path_buf(),
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| CueError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Length of an audio file in seconds.
///
/// Some formats (mp3) don't report a total duration, in which case the file
/// is decoded once and its samples counted.
pub fn measure_duration(path: &Path) -> Result<f64, CueError> {
    let decoder = open_decoder(path)?;
    if let Some(duration) = decoder.total_duration() {
        return Ok(duration.as_secs_f64());
    }

    let channels = decoder.channels().max(1) as f64;
    let sample_rate = decoder.sample_rate().max(1) as f64;
    let samples = decoder.count() as f64;
    Ok(samples / channels / sample_rate)
}

fn measure_durations(paths: &HashMap<PhaseKind, PathBuf>, engine: &EngineHandle) {
    for kind in PhaseKind::ALL {
        let Some(path) = paths.get(&kind) else {
            continue;
        };
        let result = match measure_duration(path) {
            Ok(secs) => {
                tracing::debug!(%kind, path = %path.display(), secs, "Measured cue duration");
                engine.cue_duration_discovered(kind, secs)
            }
            Err(e) => {
                tracing::info!(%kind, error = %e, "Cue unavailable, using fallback duration");
                engine.cue_unavailable(kind)
            }
        };
        if result.is_err() {
            // Engine already gone
            return;
        }
    }
}
