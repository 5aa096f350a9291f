use serde::{Deserialize, Serialize};

/// How a finished discussion is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Objective, agents, rounds, votes and the conclusion
    Full,
    /// Only the conclusion
    #[default]
    Conclusion,
    /// Machine-readable outcome
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(OutputFormat::Full),
            "conclusion" | "summary" => Ok(OutputFormat::Conclusion),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
