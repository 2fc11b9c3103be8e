use serde::Deserialize;
use std::fmt;

// ---------------- AWS section ----------------
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AwsSettings {
    pub region: String,
    #[serde(default)]
    pub aws_user: Option<String>,
}

/// Access key pair read from the secrets file. Never mutated.
#[derive(Deserialize, Clone, PartialEq)]
pub struct Credentials {
    #[serde(rename = "key")]
    pub access_key_id: String,
    #[serde(rename = "secret")]
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_the_secret() {
        let creds = Credentials {
            access_key_id: "AKIAEXAMPLE".into(),
            secret_access_key: "very-secret".into(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("AKIAEXAMPLE"));
        assert!(!printed.contains("very-secret"));
    }
}
