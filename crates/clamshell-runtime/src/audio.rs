//! cpal-backed implementations of the audio device seams.
//!
//! Output feeds interleaved stereo PCM through a lock-free SPSC ring
//! buffer into cpal's default output stream; the stream callback drains
//! the buffer and signals a condvar, which is what
//! [`AudioSink::wait_consumed`] blocks on. Capture runs the same shape in
//! reverse.

use std::sync::Arc;
use std::time::Duration;

use cpal::{
    SampleFormat,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use parking_lot::{Condvar, Mutex};
use ringbuf::{
    HeapRb,
    traits::{Consumer, Observer, Producer, Split},
};
use tracing::error;

use crate::core::MIC_FRAME_SAMPLES;
use crate::platform::{
    AudioSink, AudioSinkFactory, MicSource, MicSourceFactory, PlatformError, OUTPUT_BLOCK_SAMPLES,
};

/// Ring capacity in output blocks; enough to ride out scheduling jitter
/// without adding noticeable latency.
const OUTPUT_RING_BLOCKS: usize = 4;
const CAPTURE_RING_FRAMES: usize = 4;

/// Condvar signalled by the stream callback whenever it moves samples.
struct StreamGate {
    lock: Mutex<()>,
    cond: Condvar,
}

impl StreamGate {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            lock: Mutex::new(()),
            cond: Condvar::new(),
        })
    }

    fn notify(&self) {
        self.cond.notify_one();
    }

    /// Waits until `ready` holds or `timeout` elapses.
    fn wait_until(&self, timeout: Duration, mut ready: impl FnMut() -> bool) -> bool {
        if ready() {
            return true;
        }
        let deadline = std::time::Instant::now() + timeout;
        let mut guard = self.lock.lock();
        loop {
            if ready() {
                return true;
            }
            let now = std::time::Instant::now();
            if now >= deadline {
                return ready();
            }
            self.cond.wait_for(&mut guard, deadline - now);
        }
    }
}

fn audio_err(e: impl std::fmt::Display) -> PlatformError {
    PlatformError::AudioDevice(e.to_string())
}

fn capture_err(e: impl std::fmt::Display) -> PlatformError {
    PlatformError::CaptureDevice(e.to_string())
}

/// Fixed-block output on the default cpal device.
pub struct CpalAudioSink {
    producer: ringbuf::HeapProd<i16>,
    gate: Arc<StreamGate>,
    stream: cpal::Stream,
    sample_rate: u32,
}

impl CpalAudioSink {
    pub fn new() -> Result<Self, PlatformError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| audio_err("no default output device"))?;

        let supported = device.default_output_config().map_err(audio_err)?;
        let sample_format = supported.sample_format();
        if sample_format != SampleFormat::F32 {
            return Err(audio_err(format!(
                "only f32 output format is supported, got {sample_format:?}"
            )));
        }

        let config: cpal::StreamConfig = supported.into();
        let sample_rate = config.sample_rate;
        let channels = config.channels as usize;

        let rb = HeapRb::<i16>::new(OUTPUT_BLOCK_SAMPLES * OUTPUT_RING_BLOCKS);
        let (producer, mut consumer) = rb.split();

        let gate = StreamGate::new();
        let gate_for_cb = Arc::clone(&gate);

        let err_fn = |err| error!("audio stream error: {err}");

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    for frame in data.chunks_mut(channels) {
                        let left = consumer.try_pop().unwrap_or(0);
                        let right = consumer.try_pop().unwrap_or(left);
                        let l = f32::from(left) / 32768.0;
                        let r = f32::from(right) / 32768.0;

                        match channels {
                            0 => {}
                            1 => frame[0] = (l + r) * 0.5,
                            _ => {
                                frame[0] = l;
                                frame[1] = r;
                                for ch in &mut frame[2..] {
                                    *ch = r;
                                }
                            }
                        }
                    }
                    gate_for_cb.notify();
                },
                err_fn,
                None,
            )
            .map_err(audio_err)?;

        Ok(Self {
            producer,
            gate,
            stream,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Factory for constructing the sink on the audio worker thread.
    pub fn factory() -> AudioSinkFactory {
        Box::new(|| Ok(Box::new(Self::new()?) as Box<dyn AudioSink>))
    }
}

impl AudioSink for CpalAudioSink {
    fn start(&mut self) -> Result<(), PlatformError> {
        self.stream.play().map_err(audio_err)
    }

    fn wait_consumed(&mut self, timeout: Duration) -> Result<bool, PlatformError> {
        let producer = &self.producer;
        Ok(self
            .gate
            .wait_until(timeout, || producer.vacant_len() >= OUTPUT_BLOCK_SAMPLES))
    }

    fn submit(&mut self, block: &[i16; OUTPUT_BLOCK_SAMPLES]) -> Result<(), PlatformError> {
        // If the ring filled up in the meantime, the tail of this block is
        // dropped rather than blocking the pump.
        self.producer.push_slice(block);
        Ok(())
    }

    fn stop(&mut self) {
        let _ = self.stream.pause();
    }
}

/// Fixed-frame capture from the default cpal input device.
pub struct CpalMicSource {
    consumer: ringbuf::HeapCons<i16>,
    gate: Arc<StreamGate>,
    stream: cpal::Stream,
}

impl CpalMicSource {
    pub fn new() -> Result<Self, PlatformError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| capture_err("no default input device"))?;

        let supported = device.default_input_config().map_err(capture_err)?;
        let sample_format = supported.sample_format();
        if sample_format != SampleFormat::F32 {
            return Err(capture_err(format!(
                "only f32 capture format is supported, got {sample_format:?}"
            )));
        }

        let config: cpal::StreamConfig = supported.into();
        let channels = config.channels as usize;

        let rb = HeapRb::<i16>::new(MIC_FRAME_SAMPLES * CAPTURE_RING_FRAMES);
        let (mut producer, consumer) = rb.split();

        let gate = StreamGate::new();
        let gate_for_cb = Arc::clone(&gate);

        let err_fn = |err| error!("capture stream error: {err}");

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _| {
                    // Mono capture: keep the first channel of each frame.
                    for frame in data.chunks(channels.max(1)) {
                        let sample = (frame[0].clamp(-1.0, 1.0) * 32767.0) as i16;
                        let _ = producer.try_push(sample);
                    }
                    gate_for_cb.notify();
                },
                err_fn,
                None,
            )
            .map_err(capture_err)?;

        Ok(Self {
            consumer,
            gate,
            stream,
        })
    }

    /// Factory for constructing the source on the microphone worker thread.
    pub fn factory() -> MicSourceFactory {
        Box::new(|| Ok(Box::new(Self::new()?) as Box<dyn MicSource>))
    }
}

impl MicSource for CpalMicSource {
    fn start(&mut self) -> Result<(), PlatformError> {
        self.stream.play().map_err(capture_err)
    }

    fn capture(
        &mut self,
        frame: &mut [i16; MIC_FRAME_SAMPLES],
        timeout: Duration,
    ) -> Result<bool, PlatformError> {
        let consumer = &self.consumer;
        if !self
            .gate
            .wait_until(timeout, || consumer.occupied_len() >= MIC_FRAME_SAMPLES)
        {
            return Ok(false);
        }
        let popped = self.consumer.pop_slice(frame);
        debug_assert_eq!(popped, MIC_FRAME_SAMPLES);
        Ok(true)
    }

    fn stop(&mut self) {
        let _ = self.stream.pause();
    }
}
