/// Sound engine: procedural cues for simulation events via rodio.
///
/// Every cue is generated once at init into an in-memory WAV buffer.
/// Playback is fire-and-forget through a detached rodio Sink, so a cue
/// never blocks the frame loop.
///
/// Build without the "sound" feature to drop audio entirely (the stub
/// SoundEngine below does nothing).

use crate::sim::event::SimEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::PI;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    pub(super) const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_spotted: Arc<Vec<u8>>,
        sfx_lost: Arc<Vec<u8>>,
        sfx_contact: Arc<Vec<u8>>,
        sfx_bounce: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, running silent: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_spotted: Arc::new(make_wav(&gen_alarm())),
                sfx_lost: Arc::new(make_wav(&gen_lost())),
                sfx_contact: Arc::new(make_wav(&gen_contact())),
                sfx_bounce: Arc::new(make_wav(&gen_blip(220.0, 0.04, 0.15))),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_spotted(&self) { self.play(&self.sfx_spotted); }
        pub fn play_lost(&self) { self.play(&self.sfx_lost); }
        pub fn play_contact(&self) { self.play(&self.sfx_contact); }
        pub fn play_bounce(&self) { self.play(&self.sfx_bounce); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: mono f32 samples
    // ════════════════════════════════════════════════════════════

    pub(super) fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * 2.0 * PI).sin() * env * volume
            })
            .collect()
    }

    /// Target spotted: two rising square-ish chirps
    pub(super) fn gen_alarm() -> Vec<f32> {
        let mut samples = Vec::new();
        for _ in 0..2 {
            let n = (SAMPLE_RATE as f32 * 0.07) as usize;
            for i in 0..n {
                let p = i as f32 / n as f32;
                let freq = 700.0 + p * 500.0;
                let t = i as f32 / SAMPLE_RATE as f32;
                let wave = (t * freq * 2.0 * PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * PI).sin() * 0.3;
                samples.push(wave * (1.0 - p * 0.5) * 0.25);
            }
            samples.extend(std::iter::repeat(0.0).take((SAMPLE_RATE as f32 * 0.02) as usize));
        }
        samples
    }

    /// Target lost: slow falling whistle
    pub(super) fn gen_lost() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.2) as usize;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = 600.0 - p * 300.0;
                let t = i as f32 / SAMPLE_RATE as f32;
                (t * freq * 2.0 * PI).sin() * (1.0 - p).powf(0.6) * 0.2
            })
            .collect()
    }

    /// Contact: low buzz mixed with LCG noise
    pub(super) fn gen_contact() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.18) as usize;
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let tone = (t * 110.0 * 2.0 * PI).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.6 + noise * 0.4) * (1.0 - p).powf(0.8) * 0.3
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_spotted(&self) {}
    pub fn play_lost(&self) {}
    pub fn play_contact(&self) {}
    pub fn play_bounce(&self) {}
}

/// Play the cue for one event. Deflections stay silent; they fire too often.
pub fn play_event(engine: &SoundEngine, event: &SimEvent) {
    match event {
        SimEvent::TargetSpotted { .. } => engine.play_spotted(),
        SimEvent::TargetLost { .. } => engine.play_lost(),
        SimEvent::Contact { .. } => engine.play_contact(),
        SimEvent::WallBounce { .. } => engine.play_bounce(),
        SimEvent::Deflected { .. } => {}
    }
}
