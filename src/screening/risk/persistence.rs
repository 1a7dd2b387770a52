use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::model::RiskModel;
use crate::error::Result;

/// Reads a model file. A missing file is `Ok(None)`; unreadable or invalid
/// content is an error.
pub fn load_risk_model(path: &Path) -> Result<Option<RiskModel>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let model: RiskModel = serde_json::from_str(&raw)?;
    model.validate()?;
    Ok(Some(model))
}

pub fn save_risk_model(path: &Path, model: &RiskModel) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(model)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    tracing::info!(path = %path.display(), source = model.source.as_str(), "Risk model saved");
    Ok(())
}
