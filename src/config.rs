//! Loading of tuning rules from disk
//!
//! Rules files are JSON or TOML, picked by extension. Missing fields keep
//! their defaults.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::infer::InferenceRules;

pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<InferenceRules> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading rules file '{}'", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let rules: InferenceRules = match extension.as_deref() {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("parsing JSON rules '{}'", path.display()))?,
        Some("toml") => toml::from_str(&text)
            .with_context(|| format!("parsing TOML rules '{}'", path.display()))?,
        other => bail!(
            "unsupported rules format {:?} for '{}' (expected .json or .toml)",
            other.unwrap_or(""),
            path.display()
        ),
    };

    rules
        .validate()
        .with_context(|| format!("invalid rules in '{}'", path.display()))?;
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rules_file(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let file = rules_file(".json", r#"{ "ground_max_dx": 90.0 }"#);
        let rules = load_rules(file.path()).unwrap();
        assert_eq!(rules.ground_max_dx, 90.0);
        assert_eq!(rules.between_max_dy, InferenceRules::default().between_max_dy);
    }

    #[test]
    fn test_toml_rules() {
        let file = rules_file(".toml", "ground_max_dx = 80.0\n");
        assert_eq!(load_rules(file.path()).unwrap().ground_max_dx, 80.0);
    }

    #[test]
    fn test_negative_threshold_is_rejected() {
        let file = rules_file(".json", r#"{ "ground_max_dx": -1.0 }"#);
        let err = load_rules(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("ground_max_dx"));
    }

    #[test]
    fn test_unknown_extension() {
        let file = rules_file(".yaml", "ground_max_dx: 1");
        assert!(load_rules(file.path()).is_err());
    }
}
