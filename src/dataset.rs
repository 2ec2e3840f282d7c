use std::collections::HashMap;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

// One season (or more) of finished fixtures, indexed against a sorted
// unique team table. Construct via `from_results`; evaluators treat the
// fields as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchData {
    pub teams: Vec<String>,
    pub home_idx: Vec<usize>,
    pub away_idx: Vec<usize>,
    pub goals_home: Vec<u32>,
    pub goals_away: Vec<u32>,
    pub weights: Vec<f64>,
}

impl MatchData {
    pub fn from_results<S: AsRef<str>>(
        teams_home: &[S],
        teams_away: &[S],
        goals_home: &[u32],
        goals_away: &[u32],
        weights: Option<&[f64]>,
    ) -> Result<Self> {
        let n = teams_home.len();
        if n == 0 {
            bail!("match arrays must not be empty");
        }
        if teams_away.len() != n || goals_home.len() != n || goals_away.len() != n {
            bail!(
                "match arrays must have equal lengths: home={}, away={}, goals_home={}, goals_away={}",
                n,
                teams_away.len(),
                goals_home.len(),
                goals_away.len()
            );
        }

        let weights = match weights {
            Some(w) => {
                if w.len() != n {
                    bail!("weights length {} does not match {} matches", w.len(), n);
                }
                if w.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    bail!("weights must be finite and non-negative");
                }
                w.to_vec()
            }
            None => vec![1.0; n],
        };

        for name in teams_home.iter().chain(teams_away.iter()) {
            if name.as_ref().trim().is_empty() {
                bail!("team names must not be empty");
            }
        }

        let mut teams: Vec<String> = teams_home
            .iter()
            .chain(teams_away.iter())
            .map(|s| s.as_ref().to_string())
            .collect();
        teams.sort();
        teams.dedup();
        if teams.len() < 2 {
            bail!("need at least 2 unique teams, got {}", teams.len());
        }

        let index: HashMap<&str, usize> = teams
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();
        let home_idx = teams_home.iter().map(|t| index[t.as_ref()]).collect();
        let away_idx = teams_away.iter().map(|t| index[t.as_ref()]).collect();

        Ok(Self {
            teams,
            home_idx,
            away_idx,
            goals_home: goals_home.to_vec(),
            goals_away: goals_away.to_vec(),
            weights,
        })
    }

    pub fn n_matches(&self) -> usize {
        self.goals_home.len()
    }

    pub fn n_teams(&self) -> usize {
        self.teams.len()
    }

    pub fn team_index(&self, name: &str) -> Option<usize> {
        self.teams.iter().position(|t| t == name)
    }

    pub fn max_observed_goals(&self) -> u32 {
        self.goals_home
            .iter()
            .chain(self.goals_away.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }
}

// Exponential recency decay: a match played `days_ago` days before the
// fit cutoff gets weight exp(-xi * days_ago).
pub fn exponential_decay_weights(days_ago: &[f64], xi: f64) -> Vec<f64> {
    days_ago
        .iter()
        .map(|d| (-xi * d.max(0.0)).exp())
        .collect()
}
