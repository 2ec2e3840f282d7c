use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::dataset::MatchData;
use crate::model::ModelKind;

// Fitted team ratings in a versioned, timestamped JSON artifact so a fit
// run can be persisted and reloaded by downstream prediction tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsArtifact {
    pub version: u32,
    pub generated_at: String,
    pub model: String,
    pub teams: Vec<String>,
    pub attack: Vec<f64>,
    pub defence: Vec<f64>,
    pub home_advantage: f64,
    #[serde(default)]
    pub scalars: BTreeMap<String, f64>,
}

pub const ARTIFACT_VERSION: u32 = 1;

impl RatingsArtifact {
    // Split a packed optimizer vector back into named ratings.
    pub fn from_packed(kind: ModelKind, data: &MatchData, params: &[f64]) -> Result<Self> {
        let t = data.n_teams();
        if params.len() != kind.param_len(t) {
            bail!(
                "parameter vector length {} does not match model layout {}",
                params.len(),
                kind.param_len(t)
            );
        }

        let scalars = kind
            .scalar_names()
            .iter()
            .zip(&params[2 * t + 1..])
            .map(|(name, value)| (name.to_string(), *value))
            .collect();

        Ok(Self {
            version: ARTIFACT_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            model: format!("{kind:?}"),
            teams: data.teams.clone(),
            attack: params[..t].to_vec(),
            defence: params[t..2 * t].to_vec(),
            home_advantage: params[2 * t],
            scalars,
        })
    }

    pub fn team_index(&self, name: &str) -> Option<usize> {
        self.teams.iter().position(|t| t == name)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("serialize ratings artifact")?;
        fs::write(path, raw).with_context(|| format!("write {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read ratings artifact {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parse ratings artifact {}", path.display()))
    }
}
