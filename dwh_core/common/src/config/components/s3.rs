use super::serde_helpers::empty_string_as_none;
use serde::Deserialize;

// ---------------- S3 section ----------------
/// Locations are used verbatim inside `COPY ... FROM` and therefore keep
/// their surrounding single quotes, e.g. `'s3://udacity-dend/log_data'`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct S3Settings {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
    /// Region of the bucket; falls back to `AWS.region`.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub region: Option<String>,
}
