//! Audio playback for the healing frequencies and the ritual track.
//!
//! Playback goes through one rodio sink; at most one track is audible at
//! a time, and switching tracks stops the previous one first. Probing a
//! track (open + symphonia format probe) is the one genuinely
//! asynchronous operation here: it runs on a worker thread and reports
//! back over a channel so the animation loops never wait on the decoder.
//! A failed probe surfaces as "nothing to play", never a crash.

use anyhow::Context;
use crossbeam_channel::{unbounded, Receiver, Sender};
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::thread;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// What the probe learned about a track.
#[derive(Clone, Debug)]
pub struct TrackInfo {
    pub duration_secs: f32,
    pub sample_rate: u32,
}

#[derive(Debug)]
pub enum LoaderMessage {
    Loaded {
        name: String,
        path: PathBuf,
        info: TrackInfo,
    },
    Failed {
        name: String,
        error: String,
    },
}

pub struct AudioSystem {
    _stream: OutputStream,
    _stream_handle: rodio::OutputStreamHandle,
    sink: Sink,
    loader_tx: Sender<LoaderMessage>,
    loader_rx: Receiver<LoaderMessage>,
    active_track: Option<String>,
}

impl AudioSystem {
    pub fn new() -> Self {
        let (_stream, stream_handle) =
            OutputStream::try_default().expect("Failed to create audio output stream");
        let sink = Sink::try_new(&stream_handle).expect("Failed to create sink");
        let (loader_tx, loader_rx) = unbounded();

        Self {
            _stream,
            _stream_handle: stream_handle,
            sink,
            loader_tx,
            loader_rx,
            active_track: None,
        }
    }

    /// Probe a track off the UI thread. The result arrives through
    /// `poll_loader`; failures are an absence signal, not an error.
    pub fn request_load(&self, name: &str, path: &Path) {
        let tx = self.loader_tx.clone();
        let name = name.to_string();
        let path = path.to_path_buf();
        thread::spawn(move || {
            let msg = match probe_track(&path) {
                Ok(info) => LoaderMessage::Loaded { name, path, info },
                Err(e) => LoaderMessage::Failed {
                    name,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(msg);
        });
    }

    /// Drain pending loader results without blocking.
    pub fn poll_loader(&self) -> Vec<LoaderMessage> {
        self.loader_rx.try_iter().collect()
    }

    /// Start a looping track, replacing whatever was playing.
    pub fn play_looping(&mut self, name: &str, path: &Path) -> anyhow::Result<()> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("decoding {}", path.display()))?
            .repeat_infinite();

        self.sink.stop();
        self.sink.append(source);
        self.sink.play();
        self.active_track = Some(name.to_string());
        Ok(())
    }

    pub fn pause(&self) {
        self.sink.pause();
    }

    pub fn resume(&self) {
        self.sink.play();
    }

    pub fn stop(&mut self) {
        self.sink.stop();
        self.active_track = None;
    }

    pub fn is_playing(&self) -> bool {
        !self.sink.is_paused() && !self.sink.empty()
    }

    pub fn active_track(&self) -> Option<&str> {
        self.active_track.as_deref()
    }

    #[allow(dead_code)]
    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }
}

/// Probe a file's container for duration and sample rate without a full
/// decode.
pub fn probe_track(path: &Path) -> anyhow::Result<TrackInfo> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(&ext.to_string_lossy());
    }

    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();
    let probed =
        symphonia::default::get_probe().format(&hint, mss, &format_opts, &metadata_opts)?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| anyhow::anyhow!("No audio track found"))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let duration_secs = track
        .codec_params
        .n_frames
        .map(|frames| frames as f32 / sample_rate as f32)
        .unwrap_or(0.0);

    Ok(TrackInfo {
        duration_secs,
        sample_rate,
    })
}
