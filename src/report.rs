//! JSON report of a batch run.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::batch::{Action, BatchSummary, FileOutcome};
use crate::config::BatchConfig;
use crate::error::{TextureError, TextureResult};

fn outcome_json(o: &FileOutcome) -> Value {
    json!({
        "path": o.path.display().to_string(),
        "output": o.output.as_ref().map(|p| p.display().to_string()),
        "width": o.source.w,
        "height": o.source.h,
        "target_width": o.target.w,
        "target_height": o.target.h,
        "already_pow2": o.already_pow2,
        "action": o.action.as_str(),
        "opacity": o.opacity.class().as_str(),
        "min_alpha": o.opacity.has_alpha.then(|| o.opacity.min_alpha()),
        "max_alpha": o.opacity.has_alpha.then(|| o.opacity.max_alpha()),
    })
}

pub fn to_json(summary: &BatchSummary, config: &BatchConfig) -> Value {
    let failures: Vec<Value> = summary
        .failures
        .iter()
        .map(|f| {
            json!({
                "path": f.path.display().to_string(),
                "kind": f.error.category(),
                "error": f.error.to_string(),
            })
        })
        .collect();

    json!({
        "filter": config.filter.name(),
        "dry_run": config.dry_run,
        "processed": summary.outcomes.iter().map(outcome_json).collect::<Vec<_>>(),
        "failures": failures,
        "counts": {
            "total": summary.outcomes.len() + summary.failures.len(),
            "npot": summary.npot().count(),
            "resized": summary.count(Action::Resized),
            "passed_through": summary.count(Action::PassedThrough),
            "skipped": summary.count(Action::Skipped),
            "planned": summary.count(Action::Planned),
            "full_range_alpha": summary.full_range_alpha().count(),
            "failed": summary.failures.len(),
        },
    })
}

pub fn write_report(summary: &BatchSummary, config: &BatchConfig, path: &Path) -> TextureResult<()> {
    let text = serde_json::to_string_pretty(&to_json(summary, config))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TextureError::io("create directory", parent, e))?;
    }
    fs::write(path, text).map_err(|e| TextureError::io("write report", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alpha::OpacityProfile;
    use crate::batch::FileFailure;
    use pow2_scale::dims::Size;
    use std::path::PathBuf;

    fn summary() -> BatchSummary {
        BatchSummary {
            outcomes: vec![FileOutcome {
                path: PathBuf::from("in/a.tga"),
                output: Some(PathBuf::from("out/a.tga")),
                source: Size::new(130, 70),
                target: Size::new(256, 128),
                already_pow2: false,
                action: Action::Resized,
                opacity: OpacityProfile {
                    has_alpha: true,
                    min_stored: 0.0,
                    max_stored: 128.0,
                    full_scale: 255.0,
                },
            }],
            failures: vec![FileFailure {
                path: PathBuf::from("in/b.png"),
                error: TextureError::invalid_image("in/b.png", "truncated"),
            }],
        }
    }

    #[test]
    fn report_lists_outcomes_and_failures() {
        let v = to_json(&summary(), &BatchConfig::new("in", "out"));
        assert_eq!(v["filter"], "lanczos");
        assert_eq!(v["processed"][0]["target_width"], 256);
        assert_eq!(v["processed"][0]["opacity"], "halved");
        assert_eq!(v["processed"][0]["min_alpha"], 0);
        assert_eq!(v["processed"][0]["max_alpha"], 128);
        assert_eq!(v["failures"][0]["kind"], "invalid_image");
        assert_eq!(v["counts"]["resized"], 1);
        assert_eq!(v["counts"]["failed"], 1);
        assert_eq!(v["counts"]["total"], 2);
    }

    #[test]
    fn report_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        write_report(&summary(), &BatchConfig::new("in", "out"), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["counts"]["npot"], 1);
    }
}
