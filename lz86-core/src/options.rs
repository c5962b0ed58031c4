use serde::{Deserialize, Serialize};

use crate::codec::CodecParams;
use crate::codec::xz::{DEFAULT_TICK_BYTES, MAX_LEVEL, MIN_DICTIONARY_SIZE};
use crate::error::{Lz86Error, Result};

pub const DEFAULT_LEVEL: u32 = 7;
pub const DEFAULT_DICTIONARY_SIZE: u32 = 1 << 16;
pub const MAX_DICTIONARY_SIZE: u32 = 1 << 30;
pub const DEFAULT_SUFFIX: &str = "lzma";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOptions {
    /// Encoder preset, 0..=9.
    pub level: u32,
    /// Window size in bytes; must be a power of two.
    pub dictionary_size: u32,
    /// Extension appended to compressed file names, without the dot.
    pub suffix: String,
    /// Input bytes between two progress ticks.
    pub tick_bytes: usize,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            dictionary_size: DEFAULT_DICTIONARY_SIZE,
            suffix: DEFAULT_SUFFIX.to_string(),
            tick_bytes: DEFAULT_TICK_BYTES,
        }
    }
}

impl JobOptions {
    pub fn validate(&self) -> Result<()> {
        if self.level > MAX_LEVEL {
            return Err(Lz86Error::Config(format!(
                "level {} out of range 0..={MAX_LEVEL}",
                self.level
            )));
        }
        let d = self.dictionary_size;
        if !d.is_power_of_two() || !(MIN_DICTIONARY_SIZE..=MAX_DICTIONARY_SIZE).contains(&d) {
            return Err(Lz86Error::Config(format!(
                "dictionary size {d} must be a power of two in {MIN_DICTIONARY_SIZE}..={MAX_DICTIONARY_SIZE}"
            )));
        }
        if self.suffix.is_empty() || self.suffix.contains(['/', '\\']) {
            return Err(Lz86Error::Config(format!("invalid suffix {:?}", self.suffix)));
        }
        if self.tick_bytes == 0 {
            return Err(Lz86Error::Config("tick_bytes must be > 0".into()));
        }
        Ok(())
    }

    pub fn codec_params(&self) -> CodecParams {
        CodecParams {
            level: self.level,
            dictionary_size: self.dictionary_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let o = JobOptions::default();
        o.validate().unwrap();
        assert_eq!(o.level, 7);
        assert_eq!(o.dictionary_size, 64 * 1024);
        assert_eq!(o.suffix, "lzma");
    }

    #[test]
    fn rejects_bad_values() {
        let with = |f: fn(&mut JobOptions)| {
            let mut o = JobOptions::default();
            f(&mut o);
            o
        };
        let bad = [
            with(|o| o.level = 10),
            with(|o| o.dictionary_size = 3 << 16),
            with(|o| o.dictionary_size = 2048),
            with(|o| o.suffix.clear()),
            with(|o| o.suffix = "a/b".into()),
            with(|o| o.tick_bytes = 0),
        ];
        for o in bad {
            assert!(matches!(o.validate(), Err(Lz86Error::Config(_))), "{o:?}");
        }
    }
}
