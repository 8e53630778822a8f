//! Stand-in for the Piper binary
//!
//! A shell script that answers `--version`, reads the text from stdin and
//! copies a prepared WAV to the `--output_file` path. The failing variant
//! exits non-zero on synthesis, like an engine whose model crashed.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Sample rate of the prepared clip
pub const CLIP_SAMPLE_RATE: u32 = 16_000;

/// Frames in the prepared clip
pub const CLIP_FRAMES: u32 = 8_000;

pub struct FakeEngine {
    dir: TempDir,
    binary: PathBuf,
    model: PathBuf,
}

impl FakeEngine {
    /// Engine that always produces the prepared clip
    pub fn working() -> anyhow::Result<Self> {
        Self::create(true)
    }

    /// Engine that loads but fails every synthesis
    pub fn crashing() -> anyhow::Result<Self> {
        Self::create(false)
    }

    fn create(succeed: bool) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;

        let clip = dir.path().join("clip.wav");
        write_clip(&clip)?;

        let model = dir.path().join("en_US-test-medium.onnx");
        std::fs::write(&model, b"not really onnx")?;

        let synthesize = if succeed {
            format!("cat > /dev/null\ncp '{}' \"$out\"\n", clip.display())
        } else {
            "cat > /dev/null\necho 'model crashed' >&2\nexit 1\n".to_owned()
        };

        let script = format!(
            "#!/bin/sh\n\
             if [ \"$1\" = \"--version\" ]; then echo 1.2.0; exit 0; fi\n\
             out=''\n\
             while [ $# -gt 0 ]; do\n\
               case \"$1\" in\n\
                 --output_file) out=\"$2\"; shift 2 ;;\n\
                 *) shift ;;\n\
               esac\n\
             done\n\
             {synthesize}"
        );

        let binary = dir.path().join("piper");
        std::fs::write(&binary, script)?;
        make_executable(&binary)?;

        Ok(Self { dir, binary, model })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn model(&self) -> &Path {
        &self.model
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

fn write_clip(path: &Path) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: CLIP_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for i in 0..CLIP_FRAMES {
        let sample = if i % 40 < 20 { 6_000i16 } else { -6_000i16 };
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_: &Path) -> std::io::Result<()> {
    Ok(())
}
