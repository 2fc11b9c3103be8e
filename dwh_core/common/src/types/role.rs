use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct RoleDetails {
    pub name: String,
    pub role_id: String,
    pub arn: String,
    pub created: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl fmt::Display for RoleDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.created {
            Some(created) => writeln!(f, "Role {} exists, created on {}.", self.name, created)?,
            None => writeln!(f, "Role {} exists.", self.name)?,
        }
        writeln!(f, "Role ID: {}.", self.role_id)?;
        writeln!(f, "Role ARN: {}.", self.arn)?;
        write!(
            f,
            "Role description: '{}'.",
            self.description.as_deref().unwrap_or_default()
        )
    }
}
