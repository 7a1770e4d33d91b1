use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interview track chosen before the first message of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SoftwareEngineer,
    MlEngineer,
    DataAnalyst,
    FrontendDeveloper,
    HrInterview,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SoftwareEngineer,
        Role::MlEngineer,
        Role::DataAnalyst,
        Role::FrontendDeveloper,
        Role::HrInterview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SoftwareEngineer => "software_engineer",
            Role::MlEngineer => "ml_engineer",
            Role::DataAnalyst => "data_analyst",
            Role::FrontendDeveloper => "frontend_developer",
            Role::HrInterview => "hr_interview",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::SoftwareEngineer => "Software Engineer",
            Role::MlEngineer => "ML Engineer",
            Role::DataAnalyst => "Data Analyst",
            Role::FrontendDeveloper => "Frontend Developer",
            Role::HrInterview => "HR Interview",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown interview role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == trimmed)
            .ok_or_else(|| UnknownRole(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// Server-assigned conversation identity. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn unknown_role_id_is_rejected() {
        assert_eq!(
            "astronaut".parse::<Role>(),
            Err(UnknownRole("astronaut".to_string()))
        );
    }

    #[test]
    fn role_serializes_as_snake_case_id() {
        assert_eq!(
            serde_json::to_string(&Role::HrInterview).expect("serialize"),
            "\"hr_interview\""
        );
    }
}
