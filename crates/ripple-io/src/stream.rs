//! Real-time duplex streaming via cpal.
//!
//! The input callback forwards the first channel of every frame through a
//! bounded lock-free channel. The output callback pulls one sample per
//! frame, pushes it through a [`BlockAdapter`] so the stage always sees
//! exact blocks, and writes the result to every output channel.
//!
//! Missing input (underrun) reads as silence. A stage error halts audio:
//! the callback goes silent, reports the fault once, and [`AudioStream::run`]
//! returns [`Error::Fault`]. Input arriving while the channel is full is
//! discarded and counted.

use crate::{BlockAdapter, Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, Stream};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use ripple_core::{ProcessError, Stage};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How often `run` checks for a stop request or a fault.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether the device supports audio input.
    pub is_input: bool,
    /// Whether the device supports audio output.
    pub is_output: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

/// Stream configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per period. The stage must be built for this block size.
    pub block_size: usize,
    /// Periods of input buffered ahead of the output.
    pub periods: u32,
    /// Input device name or index (uses default if `None`).
    pub input_device: Option<String>,
    /// Output device name or index (uses default if `None`).
    pub output_device: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 64,
            periods: 3,
            input_device: None,
            output_device: None,
        }
    }
}

/// Counters gathered while a stream ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Frames written to the output device.
    pub frames: u64,
    /// Blocks processed by the stage.
    pub blocks: u64,
    /// Output callbacks that took longer than the audio they produced.
    pub overruns: u64,
    /// Frames played with no input available.
    pub underruns: u64,
    /// Input frames discarded because the output side fell behind.
    pub dropped: u64,
}

/// Send the first channel of each frame in `data`, returning how many
/// frames did not fit.
fn forward_input(tx: &Sender<f32>, data: &[f32], channels: usize) -> u64 {
    let mut dropped = 0;
    for frame in data.chunks(channels) {
        if tx.try_send(frame[0]).is_err() {
            dropped += 1;
        }
    }
    dropped
}

/// Wait until `stop` is set or a fault arrives.
fn wait_for_stop(stop: &AtomicBool, faults: &Receiver<ProcessError>) -> Option<ProcessError> {
    while !stop.load(Ordering::SeqCst) {
        match faults.recv_timeout(POLL_INTERVAL) {
            Ok(err) => return Some(err),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    None
}

/// List all available audio devices.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(inputs) = host.input_devices() {
        for device in inputs {
            if let Ok(name) = device_name(&device) {
                let sample_rate = device
                    .default_input_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(48000);
                let is_output = device.default_output_config().is_ok();

                devices.push(AudioDevice {
                    name,
                    is_input: true,
                    is_output,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device_name(&device) {
                // Already listed as an input
                if devices.iter().any(|d| d.name == name) {
                    continue;
                }

                let sample_rate = device
                    .default_output_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(48000);

                devices.push(AudioDevice {
                    name,
                    is_input: false,
                    is_output: true,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    Ok(devices)
}

/// Get the default input and output device info.
pub fn default_device() -> Result<(Option<AudioDevice>, Option<AudioDevice>)> {
    let host = cpal::default_host();

    let input = host.default_input_device().and_then(|d| {
        device_name(&d).ok().map(|name| AudioDevice {
            name,
            is_input: true,
            is_output: false,
            default_sample_rate: d
                .default_input_config()
                .map(|c| c.sample_rate())
                .unwrap_or(48000),
        })
    });

    let output = host.default_output_device().and_then(|d| {
        device_name(&d).ok().map(|name| AudioDevice {
            name,
            is_input: false,
            is_output: true,
            default_sample_rate: d
                .default_output_config()
                .map(|c| c.sample_rate())
                .unwrap_or(48000),
        })
    });

    Ok((input, output))
}

/// Real-time duplex stream running one stage.
pub struct AudioStream {
    input_device: Device,
    output_device: Device,
    config: StreamConfig,
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    streams: Vec<Stream>,
}

impl AudioStream {
    /// Open the configured devices. Nothing plays until [`run`](Self::run).
    pub fn new(config: StreamConfig) -> Result<Self> {
        if config.block_size == 0 {
            return Err(Error::Stream("block size must be at least 1 frame".into()));
        }

        let host = cpal::default_host();

        let input_device = match &config.input_device {
            Some(name) => find_input_device(&host, name)?,
            None => host.default_input_device().ok_or(Error::NoDevice)?,
        };

        let output_device = match &config.output_device {
            Some(name) => find_output_device(&host, name)?,
            None => host.default_output_device().ok_or(Error::NoDevice)?,
        };

        Ok(Self {
            input_device,
            output_device,
            config,
            running: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            streams: Vec::with_capacity(2),
        })
    }

    /// Get the configured sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Name of the opened input device.
    pub fn input_device_name(&self) -> String {
        device_name(&self.input_device).unwrap_or_else(|_| "<unknown>".into())
    }

    /// Name of the opened output device.
    pub fn output_device_name(&self) -> String {
        device_name(&self.output_device).unwrap_or_else(|_| "<unknown>".into())
    }

    /// Shared stop request.
    ///
    /// Store `true` (from a signal handler, say) to end [`run`](Self::run).
    /// A request made before `run` starts makes it return without playing.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Stop the stream.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Check whether the stream is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run `stage` between the input and output devices.
    ///
    /// Blocks until [`stop`](Self::stop) is called or the stage fails.
    /// Returns empty stats at once if a stop was already requested.
    ///
    /// # Errors
    ///
    /// [`Error::Stream`] if the stage's block size does not match the
    /// configuration or the devices refuse the stream, and [`Error::Fault`]
    /// if the stage reported an error while running.
    pub fn run<S>(&mut self, mut stage: S) -> Result<StreamStats>
    where
        S: Stage + Send + 'static,
    {
        let block_size = self.config.block_size;
        if stage.block_size() != block_size {
            return Err(Error::Stream(format!(
                "{} expects {}-frame blocks, stream delivers {}",
                stage.name(),
                stage.block_size(),
                block_size
            )));
        }

        if self.stop.load(Ordering::SeqCst) {
            tracing::info!("stop requested before start");
            return Ok(StreamStats::default());
        }

        let sample_rate = self.config.sample_rate;
        let input_channels = self
            .input_device
            .default_input_config()
            .map(|c| c.channels())
            .unwrap_or(1);
        let output_channels = self
            .output_device
            .default_output_config()
            .map(|c| c.channels())
            .unwrap_or(2);

        let input_config = cpal::StreamConfig {
            channels: input_channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Fixed(block_size as u32),
        };
        let output_config = cpal::StreamConfig {
            channels: output_channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Fixed(block_size as u32),
        };

        // Mono samples from input to output
        let buffered = block_size * self.config.periods.max(1) as usize;
        let (tx, rx) = crossbeam_channel::bounded::<f32>((buffered * 4).max(1024));
        for _ in 0..buffered {
            let _ = tx.try_send(0.0);
        }

        let (fault_tx, fault_rx) = crossbeam_channel::bounded::<ProcessError>(1);

        let frames = Arc::new(AtomicU64::new(0));
        let blocks = Arc::new(AtomicU64::new(0));
        let overruns = Arc::new(AtomicU64::new(0));
        let underruns = Arc::new(AtomicU64::new(0));
        let dropped = Arc::new(AtomicU64::new(0));

        let running_input = Arc::clone(&self.running);
        let cb_dropped = Arc::clone(&dropped);
        let in_ch = usize::from(input_channels.max(1));
        let input_stream = self
            .input_device
            .build_input_stream(
                &input_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !running_input.load(Ordering::Relaxed) {
                        return;
                    }
                    let lost = forward_input(&tx, data, in_ch);
                    if lost > 0 {
                        cb_dropped.fetch_add(lost, Ordering::Relaxed);
                    }
                },
                |err| tracing::error!(%err, "input stream error"),
                None,
            )
            .map_err(|e| Error::Stream(format!("failed to build input stream: {e}")))?;

        let running_output = Arc::clone(&self.running);
        let out_ch = usize::from(output_channels.max(1));
        let frame_secs = 1.0 / f64::from(sample_rate);
        let mut adapter = BlockAdapter::new(block_size);
        let mut faulted = false;
        let (cb_frames, cb_blocks, cb_overruns, cb_underruns) = (
            Arc::clone(&frames),
            Arc::clone(&blocks),
            Arc::clone(&overruns),
            Arc::clone(&underruns),
        );
        let output_stream = self
            .output_device
            .build_output_stream(
                &output_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if faulted || !running_output.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }

                    let start = Instant::now();
                    let mut frame_count = 0u64;
                    let mut missing = 0u64;

                    for frame in data.chunks_mut(out_ch) {
                        frame_count += 1;
                        if faulted {
                            frame.fill(0.0);
                            continue;
                        }
                        let sample = rx.try_recv().unwrap_or_else(|_| {
                            missing += 1;
                            0.0
                        });
                        match adapter.push(&mut stage, sample) {
                            Ok(y) => frame.fill(y),
                            Err(err) => {
                                faulted = true;
                                let _ = fault_tx.try_send(err);
                                frame.fill(0.0);
                            }
                        }
                    }

                    let budget = Duration::from_secs_f64(frame_count as f64 * frame_secs);
                    if start.elapsed() > budget {
                        cb_overruns.fetch_add(1, Ordering::Relaxed);
                    }
                    cb_frames.fetch_add(frame_count, Ordering::Relaxed);
                    cb_underruns.fetch_add(missing, Ordering::Relaxed);
                    cb_blocks.store(adapter.blocks(), Ordering::Relaxed);
                },
                |err| tracing::error!(%err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(format!("failed to build output stream: {e}")))?;

        self.running.store(true, Ordering::SeqCst);
        if let Err(e) = input_stream.play().and_then(|()| output_stream.play()) {
            self.running.store(false, Ordering::SeqCst);
            return Err(Error::Stream(format!("failed to start streams: {e}")));
        }
        self.streams.push(input_stream);
        self.streams.push(output_stream);

        tracing::info!(
            sample_rate,
            block_size,
            input_channels,
            output_channels,
            "stream started"
        );

        let fault = wait_for_stop(&self.stop, &fault_rx);

        self.running.store(false, Ordering::SeqCst);
        self.streams.clear();

        let stats = StreamStats {
            frames: frames.load(Ordering::Relaxed),
            blocks: blocks.load(Ordering::Relaxed),
            overruns: overruns.load(Ordering::Relaxed),
            underruns: underruns.load(Ordering::Relaxed),
            dropped: dropped.load(Ordering::Relaxed),
        };

        if let Some(err) = fault {
            tracing::error!(%err, blocks = stats.blocks, "stream halted");
            return Err(Error::Fault(err));
        }

        tracing::info!(
            frames = stats.frames,
            blocks = stats.blocks,
            overruns = stats.overruns,
            underruns = stats.underruns,
            dropped = stats.dropped,
            "stream stopped"
        );
        Ok(stats)
    }
}

/// Find an input device by exact name, partial name, or index.
fn find_input_device(host: &Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<_> = host
        .input_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    find_device_from_list(&devices, name_or_index, "input")
}

/// Find an output device by exact name, partial name, or index.
fn find_output_device(host: &Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<_> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    find_device_from_list(&devices, name_or_index, "output")
}

/// Find a device from a list by index, exact name, or case-insensitive
/// partial match.
fn find_device_from_list(devices: &[Device], name_or_index: &str, kind: &str) -> Result<Device> {
    if let Ok(index) = name_or_index.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "{} device index {} (only {} devices available)",
                kind,
                index,
                devices.len()
            ))
        });
    }

    for device in devices {
        if device_name(device).is_ok_and(|n| n == name_or_index) {
            return Ok(device.clone());
        }
    }

    let search_lower = name_or_index.to_lowercase();
    let mut matches: Vec<_> = devices
        .iter()
        .filter_map(|d| {
            device_name(d)
                .ok()
                .filter(|name| name.to_lowercase().contains(&search_lower))
                .map(|name| (d.clone(), name))
        })
        .collect();

    if matches.len() > 1 {
        let names: Vec<_> = matches.iter().map(|(_, n)| n.as_str()).collect();
        tracing::warn!(
            search = name_or_index,
            kind,
            ?names,
            "multiple devices match, using the first"
        );
    }

    if matches.is_empty() {
        Err(Error::DeviceNotFound(format!(
            "no {} device matching '{}'",
            kind, name_or_index
        )))
    } else {
        Ok(matches.swap_remove(0).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices() {
        // Device availability depends on the system
        let result = list_devices();
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_device() {
        let result = default_device();
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.block_size, 64);
        assert_eq!(config.periods, 3);
    }

    #[test]
    fn test_forward_input_counts_overflow() {
        let (tx, rx) = crossbeam_channel::bounded::<f32>(3);
        // stereo: left channel only
        let data = [0.1, 9.0, 0.2, 9.0, 0.3, 9.0, 0.4, 9.0, 0.5, 9.0];
        assert_eq!(forward_input(&tx, &data, 2), 2);
        let got: Vec<f32> = rx.try_iter().collect();
        assert_eq!(got, vec![0.1, 0.2, 0.3]);
        assert_eq!(forward_input(&tx, &data[..4], 2), 0);
    }

    #[test]
    fn test_stop_requested_early_returns_at_once() {
        let stop = AtomicBool::new(true);
        let (_tx, rx) = crossbeam_channel::bounded::<ProcessError>(1);
        let start = Instant::now();
        assert!(wait_for_stop(&stop, &rx).is_none());
        assert!(start.elapsed() < POLL_INTERVAL);
    }

    #[test]
    fn test_wait_returns_fault() {
        let stop = AtomicBool::new(false);
        let (tx, rx) = crossbeam_channel::bounded::<ProcessError>(1);
        tx.send(ProcessError::BlockLength {
            expected: 4,
            actual: 3,
        })
        .unwrap();
        let fault = wait_for_stop(&stop, &rx);
        assert!(matches!(
            fault,
            Some(ProcessError::BlockLength {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_wait_ends_when_faults_disconnect() {
        let stop = AtomicBool::new(false);
        let (tx, rx) = crossbeam_channel::bounded::<ProcessError>(1);
        drop(tx);
        assert!(wait_for_stop(&stop, &rx).is_none());
    }

    #[test]
    fn test_missing_device_index() {
        let err = find_device_from_list(&[], "3", "input").err();
        assert!(matches!(err, Some(Error::DeviceNotFound(msg)) if msg.contains("index 3")));
    }

    #[test]
    fn test_missing_device_name() {
        let err = find_device_from_list(&[], "usb", "output").err();
        assert!(matches!(err, Some(Error::DeviceNotFound(msg)) if msg.contains("'usb'")));
    }
}
