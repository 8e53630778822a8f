use std::{
    io::{Seek, Write},
    path::Path,
    time::Duration,
};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Sample rate of the fallback clip
pub const SILENCE_SAMPLE_RATE: u32 = 22_050;

/// Number of samples in the fallback clip (one second)
pub const SILENCE_SAMPLES: u32 = SILENCE_SAMPLE_RATE;

/// Mono, 16-bit signed PCM at 22.05 kHz
pub const fn silence_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: SILENCE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Write one second of silence as a complete WAV stream
pub fn write_silence<W: Write + Seek>(writer: W) -> hound::Result<()> {
    let mut wav = WavWriter::new(writer, silence_spec())?;

    for _ in 0..SILENCE_SAMPLES {
        wav.write_sample(0i16)?;
    }

    wav.finalize()
}

/// Header facts about a WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSummary {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Frames per channel
    pub frames: u32,
}

impl WavSummary {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }

        Duration::from_secs_f64(f64::from(self.frames) / f64::from(self.sample_rate))
    }
}

/// Read the header of a WAV file without decoding samples
pub fn inspect(path: &Path) -> hound::Result<WavSummary> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    Ok(WavSummary {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        frames: reader.duration(),
    })
}
