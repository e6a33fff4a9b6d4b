//! Per-run artifacts root directory naming

use chrono::{DateTime, Utc};
use std::path::Path;

/// Format a run start time the way artifact directories are named,
/// e.g. `2024-03-01 09-30-05Z`.
pub fn timestamp_string(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H-%M-%SZ").to_string()
}

/// Build the artifacts root directory for a run.
///
/// A `root_dir` ending in a path separator is taken verbatim. Anything else
/// gets a `<configuration>.<timestamp>` subdirectory so that consecutive runs
/// (and different configurations) do not overwrite each other.
pub fn build_default_artifacts_root_dirpath(
    configuration: &str,
    root_dir: &str,
    start_time: DateTime<Utc>,
) -> String {
    if root_dir.ends_with('/') || root_dir.ends_with('\\') {
        return root_dir.to_string();
    }

    let subdir = format!("{}.{}", configuration, timestamp_string(start_time));
    Path::new(root_dir).join(subdir).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap()
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(timestamp_string(start()), "2024-03-01 09-30-05Z");
    }

    #[test]
    fn test_appends_configuration_subdir() {
        let dir = build_default_artifacts_root_dirpath("ios.sim.release", "artifacts", start());
        assert_eq!(
            Path::new(&dir),
            Path::new("artifacts").join("ios.sim.release.2024-03-01 09-30-05Z")
        );
    }

    #[test]
    fn test_trailing_separator_is_verbatim() {
        assert_eq!(
            build_default_artifacts_root_dirpath("ios", "/tmp/out/", start()),
            "/tmp/out/"
        );
        assert_eq!(
            build_default_artifacts_root_dirpath("ios", "C:\\out\\", start()),
            "C:\\out\\"
        );
    }
}
