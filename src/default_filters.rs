//! Default-Filter Loader (spec.md §4.7): per-service default filter fragments
//! keyed `<service>.<namespace>`.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

const MAX_SIZE: u64 = 1024 * 1024;

fn filename_pattern() -> Regex {
    Regex::new(r"^[A-Za-z0-9._-]+\.[A-Za-z0-9._-]+$").unwrap()
}

/// Scans `dir` once and returns a map keyed `(service, namespace)` -> raw
/// filter fragment. Invalid fragments are kept as strings; the consuming
/// filter-DSL parser surfaces the error later.
pub fn load(dir: &Path) -> HashMap<(String, String), String> {
    let pattern = filename_pattern();
    let mut result = HashMap::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!("failed to read default filters dir {}: {err}", dir.display());
            return result;
        }
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if !pattern.is_match(file_name) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if metadata.len() > MAX_SIZE {
            tracing::warn!("skipping default filter file {file_name}: larger than 1 MiB");
            continue;
        }
        // `<service>.<namespace>`: split on the first dot only, namespace is
        // everything after it (so a service name itself may not contain dots).
        let Some((service, namespace)) = file_name.split_once('.') else {
            continue;
        };
        match std::fs::read_to_string(entry.path()) {
            Ok(contents) => {
                result.insert((service.to_string(), namespace.to_string()), contents);
            }
            Err(err) => {
                tracing::warn!("failed to read default filter file {file_name}: {err}");
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_valid_files_keyed_by_service_and_namespace() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("service1.namespace1"), "ratelimit()").unwrap();
        let loaded = load(dir.path());
        assert_eq!(
            loaded.get(&("service1".to_string(), "namespace1".to_string())),
            Some(&"ratelimit()".to_string())
        );
    }

    #[test]
    fn skips_files_with_invalid_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("noextension"), "x").unwrap();
        let loaded = load(dir.path());
        assert!(loaded.is_empty());
    }

    #[test]
    fn skips_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let huge = "a".repeat((MAX_SIZE + 1) as usize);
        fs::write(dir.path().join("service1.namespace1"), huge).unwrap();
        let loaded = load(dir.path());
        assert!(loaded.is_empty());
    }

    #[test]
    fn skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("service1.namespace1")).unwrap();
        let loaded = load(dir.path());
        assert!(loaded.is_empty());
    }
}
