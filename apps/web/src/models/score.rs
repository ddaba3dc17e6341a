use serde::{Deserialize, Serialize};

/// Scores below this route the user to the "needs improvement" flow.
pub const NEEDS_IMPROVEMENT_THRESHOLD: f64 = 40.0;

/// The backend's assessment of a résumé against a job description. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub match_score: f64,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Which follow-up flow the UI offers after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBranch {
    NeedsImprovement,
    Optimize,
}

impl ScoreResult {
    pub fn branch(&self) -> ScoreBranch {
        if self.match_score < NEEDS_IMPROVEMENT_THRESHOLD {
            ScoreBranch::NeedsImprovement
        } else {
            ScoreBranch::Optimize
        }
    }
}
