//! Display strings handed to progress surfaces.

use super::estimator::ProgressSample;

const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

pub fn size_to_string(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut v = bytes as f64 / 1024.0;
    let mut unit = 0;
    while v >= 1024.0 && unit + 1 < UNITS.len() {
        v /= 1024.0;
        unit += 1;
    }
    format!("{v:.2} {}", UNITS[unit])
}

pub fn millis_to_string(ms: u64) -> String {
    let secs = ms / 1000;
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

pub fn ratio_to_string(ratio_percent: Option<f64>) -> String {
    match ratio_percent {
        Some(r) => format!("{r:.1}%"),
        None => "n/a".to_string(),
    }
}

/// `"<name>  ratio 41.3%  1.00 MiB / 4.00 MiB  speed 2.00 MiB/s  elapsed 3s  left 1s"`
pub fn status_line(name: &str, sample: &ProgressSample, total_bytes: u64) -> String {
    format!(
        "{name}  ratio {}  {} / {}  speed {}/s  elapsed {}  left {}",
        ratio_to_string(sample.ratio_percent),
        size_to_string(sample.processed_bytes),
        size_to_string(total_bytes),
        size_to_string(sample.speed_bytes_per_sec as u64),
        millis_to_string(sample.elapsed_ms),
        millis_to_string(sample.eta_ms),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(size_to_string(0), "0 B");
        assert_eq!(size_to_string(1023), "1023 B");
        assert_eq!(size_to_string(1536), "1.50 KiB");
        assert_eq!(size_to_string(20 * 1024 * 1024), "20.00 MiB");
    }

    #[test]
    fn durations() {
        assert_eq!(millis_to_string(999), "0s");
        assert_eq!(millis_to_string(65_000), "1m 05s");
        assert_eq!(millis_to_string(3_723_000), "1h 02m 03s");
    }

    #[test]
    fn ratio_and_line() {
        assert_eq!(ratio_to_string(None), "n/a");
        assert_eq!(ratio_to_string(Some(41.26)), "41.3%");

        let s = ProgressSample {
            elapsed_ms: 3_000,
            processed_bytes: 1 << 20,
            emitted_bytes: 1 << 19,
            speed_bytes_per_sec: 2.0 * 1024.0 * 1024.0,
            eta_ms: 1_500,
            ratio_percent: Some(50.0),
        };
        assert_eq!(
            status_line("a.bin", &s, 4 << 20),
            "a.bin  ratio 50.0%  1.00 MiB / 4.00 MiB  speed 2.00 MiB/s  elapsed 3s  left 1s"
        );
    }
}
