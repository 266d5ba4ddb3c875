//! Export of the in-memory sample set to a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::sample::TelemetrySample;

/// `streaming-metrics-<epoch ms>.json`
pub fn export_filename(now_ms: i64) -> String {
    format!("streaming-metrics-{now_ms}.json")
}

/// Serialize `samples` as pretty-printed JSON.
pub fn to_json_pretty(samples: &[TelemetrySample]) -> std::io::Result<String> {
    serde_json::to_string_pretty(samples).map_err(std::io::Error::other)
}

/// Write `samples` into `dir` under [`export_filename`] and return the path.
pub fn write_export(
    dir: &Path,
    samples: &[TelemetrySample],
    now_ms: i64,
) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(now_ms));
    fs::write(&path, to_json_pretty(samples)?)?;
    log::info!("exported {} samples to {}", samples.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_sample;

    #[test]
    fn filename_embeds_timestamp() {
        assert_eq!(
            export_filename(1_700_000_000_123),
            "streaming-metrics-1700000000123.json"
        );
    }

    #[test]
    fn write_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let samples = vec![generate_sample(1000), generate_sample(2000)];
        let path = write_export(dir.path(), &samples, 42).unwrap();
        assert_eq!(path.file_name().unwrap(), "streaming-metrics-42.json");

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  {"), "expected pretty-printed output");
        let back: Vec<TelemetrySample> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, samples);
    }

    #[test]
    fn write_export_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("today");
        let path = write_export(&nested, &[], 7).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }
}
