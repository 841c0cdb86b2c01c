//! Tone generator: the actuator boundary.
//!
//! The main loop commands the generator through the [`ToneGenerator`]
//! trait and guarantees the call preconditions itself: `start` is never
//! issued while running, `stop` never while stopped. The shipped
//! implementation synthesizes a pulse wave on the default audio output;
//! tests substitute a recording mock.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use thiserror::Error;

/// Failures surfaced by a tone generator.
///
/// Start/stop failures are recoverable at the main-loop level: the loop
/// logs them and leaves the run flag unchanged. A missing output device
/// at construction time is fatal to startup.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// No audio output device is available.
    #[error("no default audio output device")]
    NoDevice,
    /// The device rejected its default stream configuration.
    #[error("querying stream config failed: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    /// The output stream could not be built.
    #[error("building output stream failed: {0}")]
    Build(#[from] cpal::BuildStreamError),
    /// The output stream could not be started.
    #[error("starting output stream failed: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// The actuator contract: a periodic waveform at a commanded frequency
/// and duty ratio.
pub trait ToneGenerator {
    /// One-time setup with the idle base frequency, before the loop runs.
    fn configure(&mut self, base_hz: f32) -> Result<(), GeneratorError>;

    /// Begin emitting at `frequency` Hz with the given duty ratio.
    ///
    /// Callers only invoke this while stopped.
    fn start(&mut self, frequency: f32, duty: f32) -> Result<(), GeneratorError>;

    /// Halt emission. Callers only invoke this while running.
    fn stop(&mut self) -> Result<(), GeneratorError>;

    /// Whether the generator is currently emitting.
    fn is_running(&self) -> bool;
}

/// Pulse-wave oscillator with a variable duty ratio.
///
/// One period spans phase 0..1; the output is `+amplitude` while the
/// phase is below the duty ratio and `-amplitude` for the rest.
#[derive(Debug, Clone)]
pub struct PulseWave {
    phase: f32,
    step: f32,
    duty: f32,
    amplitude: f32,
}

impl PulseWave {
    /// Oscillator for `frequency` Hz at the given sample rate.
    pub fn new(frequency: f32, duty: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            step: frequency / sample_rate.max(1.0),
            duty: duty.clamp(f32::EPSILON, 1.0),
            amplitude: 0.25,
        }
    }

    /// Produce the next sample and advance the phase.
    pub fn next_sample(&mut self) -> f32 {
        let sample = if self.phase < self.duty {
            self.amplitude
        } else {
            -self.amplitude
        };
        self.phase += self.step;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }
}

/// Tone generator backed by the default cpal output device.
///
/// `start` builds and plays a fresh output stream; `stop` drops it,
/// which halts the hardware callback.
pub struct AudioGenerator {
    device: cpal::Device,
    base_hz: f32,
    stream: Option<Stream>,
}

impl AudioGenerator {
    /// Open the default output device.
    pub fn new() -> Result<Self, GeneratorError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(GeneratorError::NoDevice)?;
        Ok(Self {
            device,
            base_hz: 0.0,
            stream: None,
        })
    }

    fn build_stream(&self, frequency: f32, duty: f32) -> Result<Stream, GeneratorError> {
        let supported = self.device.default_output_config()?;
        let config = supported.config();
        let sample_rate = config.sample_rate.0 as f32;
        let wave = PulseWave::new(frequency, duty, sample_rate);

        let stream = match supported.sample_format() {
            SampleFormat::I16 => build_output::<i16>(&self.device, &config, wave, |s| {
                (s * f32::from(i16::MAX)) as i16
            })?,
            // f32 output, and the fallback for anything exotic.
            _ => build_output::<f32>(&self.device, &config, wave, |s| s)?,
        };
        Ok(stream)
    }
}

impl ToneGenerator for AudioGenerator {
    fn configure(&mut self, base_hz: f32) -> Result<(), GeneratorError> {
        self.base_hz = base_hz;
        log::debug!("audio generator configured, base {base_hz} Hz");
        Ok(())
    }

    fn start(&mut self, frequency: f32, duty: f32) -> Result<(), GeneratorError> {
        log::debug!(
            "tone start: {frequency} Hz, duty {duty} (base {})",
            self.base_hz
        );
        let stream = self.build_stream(frequency, duty)?;
        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), GeneratorError> {
        // Dropping the stream tears the callback down.
        self.stream = None;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }
}

fn build_output<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut wave: PulseWave,
    mut convert: impl FnMut(f32) -> T + Send + 'static,
) -> Result<Stream, GeneratorError>
where
    T: cpal::SizedSample,
{
    let channels = usize::from(config.channels);
    let stream = device.build_output_stream(
        config,
        move |output: &mut [T], _| {
            for frame in output.chunks_mut(channels) {
                let value = convert(wave.next_sample());
                for channel in frame {
                    *channel = value;
                }
            }
        },
        |err| log::error!("audio stream error: {err}"),
        None,
    )?;
    Ok(stream)
}
