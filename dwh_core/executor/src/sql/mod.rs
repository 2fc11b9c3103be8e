//! The fixed statement lists for the star schema.
//!
//! Only the two `COPY` statements depend on configuration; everything else
//! is static text.

pub mod tables;

use common::config::components::global::DwhConfig;
use common::config::error::ConfigError;
use std::fmt;
use tables::*;

pub const DROP_STATEMENTS: [&str; 7] = [
    STAGING_EVENTS_DROP,
    STAGING_SONGS_DROP,
    SONGPLAYS_DROP,
    USERS_DROP,
    SONGS_DROP,
    ARTISTS_DROP,
    TIME_DROP,
];

pub const CREATE_STATEMENTS: [&str; 7] = [
    STAGING_EVENTS_CREATE,
    STAGING_SONGS_CREATE,
    SONGPLAYS_CREATE,
    USERS_CREATE,
    SONGS_CREATE,
    ARTISTS_CREATE,
    TIME_CREATE,
];

pub const INSERT_STATEMENTS: [&str; 5] = [
    SONGPLAYS_INSERT,
    USERS_INSERT,
    SONGS_INSERT,
    ARTISTS_INSERT,
    TIME_INSERT,
];

/// create temp → copy one row per key → drop original → rename temp.
pub const DEDUP_USERS_STATEMENTS: [&str; 4] = [
    TEMP_USERS_CREATE,
    TEMP_USERS_LOAD,
    USERS_DROP,
    TEMP_USERS_RENAME,
];

pub const DEDUP_ARTISTS_STATEMENTS: [&str; 4] = [
    TEMP_ARTISTS_CREATE,
    TEMP_ARTISTS_LOAD,
    ARTISTS_DROP,
    TEMP_ARTISTS_RENAME,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    Drop,
    Create,
    StageCopy,
    TransformInsert,
    Deduplicate,
}

impl Pipeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pipeline::Drop => "drop",
            Pipeline::Create => "create",
            Pipeline::StageCopy => "stage-copy",
            Pipeline::TransformInsert => "transform-insert",
            Pipeline::Deduplicate => "deduplicate",
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the `COPY` statements need. Object-storage locations are
/// embedded as written in the configuration, quotes included.
#[derive(Debug, Clone, PartialEq)]
pub struct CopySources {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
    pub region: String,
    pub role_arn: String,
}

impl CopySources {
    pub fn from_config(config: &DwhConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            log_data: config.s3.log_data.clone(),
            log_jsonpath: config.s3.log_jsonpath.clone(),
            song_data: config.s3.song_data.clone(),
            region: config.copy_region().to_string(),
            role_arn: config.role_arn()?.to_string(),
        })
    }

    fn staging_events_copy(&self) -> String {
        format!(
            "
    COPY staging_events
    FROM {}
    iam_role '{}'
    region '{}'
    COMPUPDATE OFF
    JSON {};
",
            self.log_data, self.role_arn, self.region, self.log_jsonpath
        )
    }

    fn staging_songs_copy(&self) -> String {
        format!(
            "
    COPY staging_songs
    FROM {}
    iam_role '{}'
    region '{}'
    COMPUPDATE OFF
    FORMAT AS json 'auto';
",
            self.song_data, self.role_arn, self.region
        )
    }
}

#[derive(Debug, Clone)]
pub struct SqlCatalog {
    sources: CopySources,
}

impl SqlCatalog {
    pub fn new(sources: CopySources) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &CopySources {
        &self.sources
    }

    /// Statements of `pipeline` in execution order.
    pub fn statements(&self, pipeline: Pipeline) -> Vec<String> {
        match pipeline {
            Pipeline::Drop => owned(&DROP_STATEMENTS),
            Pipeline::Create => owned(&CREATE_STATEMENTS),
            Pipeline::StageCopy => vec![
                self.sources.staging_events_copy(),
                self.sources.staging_songs_copy(),
            ],
            Pipeline::TransformInsert => owned(&INSERT_STATEMENTS),
            Pipeline::Deduplicate => {
                let mut statements = owned(&DEDUP_USERS_STATEMENTS);
                statements.extend(owned(&DEDUP_ARTISTS_STATEMENTS));
                statements
            }
        }
    }
}

fn owned(statements: &[&str]) -> Vec<String> {
    statements.iter().map(|s| s.to_string()).collect()
}
