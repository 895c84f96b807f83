use std::{fmt, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Subject {
    Math,
    Physics,
    Chemistry,
    Biology,
    English,
}

impl Default for Subject {
    fn default() -> Self {
        Subject::Math
    }
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::Math,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::English,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Biology => "biology",
            Subject::English => "english",
        }
    }

    /// Human-facing label, also used when prompting the collaborator.
    pub fn label(&self) -> &'static str {
        match self {
            Subject::Math => "Mathematics",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::English => "English",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "math" => Ok(Subject::Math),
            "physics" => Ok(Subject::Physics),
            "chemistry" => Ok(Subject::Chemistry),
            "biology" => Ok(Subject::Biology),
            "english" => Ok(Subject::English),
            _ => Err(anyhow!("unknown subject '{value}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_subject_case_insensitively() {
        for subject in Subject::ALL {
            let upper = subject.as_str().to_ascii_uppercase();
            assert_eq!(upper.parse::<Subject>().unwrap(), subject);
        }
    }

    #[test]
    fn rejects_free_form_subjects() {
        assert!("history".parse::<Subject>().is_err());
        assert!(serde_json::from_str::<Subject>("\"history\"").is_err());
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        assert_eq!(
            serde_json::to_string(&Subject::Chemistry).unwrap(),
            "\"chemistry\""
        );
    }
}
