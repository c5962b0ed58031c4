use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::Mode;
use crate::error::{Lz86Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub source: PathBuf,
    pub target: PathBuf,
    pub mode: Mode,
}

/// `a/b.txt` -> `a/b.txt.lzma`
pub fn with_suffix(p: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = p.as_os_str().to_owned();
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}

/// `a/b.txt.lzma` -> `a/b.txt`; `None` when the name does not carry the suffix.
pub fn strip_suffix(p: &Path, suffix: &str) -> Option<PathBuf> {
    let name = p.file_name()?.to_str()?;
    let stem = name.strip_suffix(suffix)?.strip_suffix('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(p.with_file_name(stem))
}

pub fn has_suffix(p: &Path, suffix: &str) -> bool {
    strip_suffix(p, suffix).is_some()
}

// Existence check is advisory only: the file may change before it is opened.
fn infer_from_source(source: &Path, suffix: &str) -> Mode {
    if has_suffix(source, suffix) && source.exists() {
        Mode::Decompress
    } else {
        Mode::Compress
    }
}

fn missing_suffix(p: &Path, suffix: &str) -> Lz86Error {
    Lz86Error::Config(format!(
        "{} does not end in .{suffix}; give both input and output",
        p.display()
    ))
}

/// Fill in whichever designation is missing and settle the mode.
///
/// An explicit `mode` always wins. Otherwise an existing input carrying the
/// suffix means decompress, and an output-only call compresses when the
/// output carries the suffix.
pub fn resolve(
    input: Option<&Path>,
    output: Option<&Path>,
    mode: Option<Mode>,
    suffix: &str,
) -> Result<ResolvedPaths> {
    let (source, target, mode) = match (input, output) {
        (None, None) => {
            return Err(Lz86Error::Config("no input or output given".into()));
        }
        (Some(i), Some(o)) => {
            let mode = mode.unwrap_or_else(|| infer_from_source(i, suffix));
            (i.to_path_buf(), o.to_path_buf(), mode)
        }
        (Some(i), None) => {
            let mode = mode.unwrap_or_else(|| infer_from_source(i, suffix));
            let target = match mode {
                Mode::Compress => with_suffix(i, suffix),
                Mode::Decompress => {
                    strip_suffix(i, suffix).ok_or_else(|| missing_suffix(i, suffix))?
                }
            };
            (i.to_path_buf(), target, mode)
        }
        (None, Some(o)) => {
            let mode = mode.unwrap_or(if has_suffix(o, suffix) {
                Mode::Compress
            } else {
                Mode::Decompress
            });
            let source = match mode {
                Mode::Compress => {
                    strip_suffix(o, suffix).ok_or_else(|| missing_suffix(o, suffix))?
                }
                Mode::Decompress => with_suffix(o, suffix),
            };
            (source, o.to_path_buf(), mode)
        }
    };

    let source = std::path::absolute(source)?;
    let target = std::path::absolute(target)?;
    if source == target {
        return Err(Lz86Error::Config(format!(
            "source and target are the same file: {}",
            source.display()
        )));
    }
    debug!(?mode, source = %source.display(), target = %target.display(), "resolved paths");
    Ok(ResolvedPaths {
        source,
        target,
        mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn suffix_helpers() {
        let p = Path::new("dir/data.bin");
        assert_eq!(with_suffix(p, "lzma"), PathBuf::from("dir/data.bin.lzma"));
        assert_eq!(
            strip_suffix(Path::new("dir/data.bin.lzma"), "lzma"),
            Some(PathBuf::from("dir/data.bin"))
        );
        assert_eq!(strip_suffix(Path::new("dir/datalzma"), "lzma"), None);
        assert_eq!(strip_suffix(Path::new(".lzma"), "lzma"), None);
        assert!(!has_suffix(p, "lzma"));
    }

    #[test]
    fn input_only_compresses_to_suffixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt");
        fs::write(&input, b"x").unwrap();
        let r = resolve(Some(&input), None, None, "lzma").unwrap();
        assert_eq!(r.mode, Mode::Compress);
        assert_eq!(r.source, input);
        assert_eq!(r.target, dir.path().join("a.txt.lzma"));
    }

    #[test]
    fn existing_suffixed_input_decompresses() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.txt.lzma");
        fs::write(&input, b"x").unwrap();
        let r = resolve(Some(&input), None, None, "lzma").unwrap();
        assert_eq!(r.mode, Mode::Decompress);
        assert_eq!(r.target, dir.path().join("a.txt"));
    }

    #[test]
    fn missing_suffixed_input_defaults_to_compress() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gone.lzma");
        let r = resolve(Some(&input), None, None, "lzma").unwrap();
        assert_eq!(r.mode, Mode::Compress);
        assert_eq!(r.target, dir.path().join("gone.lzma.lzma"));
    }

    #[test]
    fn output_only_derives_input() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("b.log.lzma");
        let r = resolve(None, Some(&out), None, "lzma").unwrap();
        assert_eq!(r.mode, Mode::Compress);
        assert_eq!(r.source, dir.path().join("b.log"));

        let plain = dir.path().join("b.log");
        let r = resolve(None, Some(&plain), None, "lzma").unwrap();
        assert_eq!(r.mode, Mode::Decompress);
        assert_eq!(r.source, dir.path().join("b.log.lzma"));
    }

    #[test]
    fn explicit_mode_overrides_inference() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("c.lzma");
        fs::write(&input, b"x").unwrap();
        let r = resolve(Some(&input), None, Some(Mode::Compress), "lzma").unwrap();
        assert_eq!(r.mode, Mode::Compress);

        let err = resolve(Some(&dir.path().join("c.bin")), None, Some(Mode::Decompress), "lzma");
        assert!(matches!(err, Err(Lz86Error::Config(_))));
    }

    #[test]
    fn rejects_empty_and_identical_designations() {
        assert!(matches!(
            resolve(None, None, None, "lzma"),
            Err(Lz86Error::Config(_))
        ));
        let p = Path::new("same.bin");
        assert!(matches!(
            resolve(Some(p), Some(p), None, "lzma"),
            Err(Lz86Error::Config(_))
        ));
    }
}
