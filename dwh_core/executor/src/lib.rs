pub mod sql;

use crate::sql::{Pipeline, SqlCatalog};
use common::error::diagnostics::DiagnosticMessage;
use log::{debug, error, info};
use shared_clients::{AsyncDatabaseAdapter, DatabaseAdapterError};
use std::error::Error;
use thiserror::Error;

/// drop, then create (the schema reset).
pub const RECREATE_PIPELINES: [Pipeline; 2] = [Pipeline::Drop, Pipeline::Create];

/// stage-copy, transform-insert, deduplicate.
pub const ETL_PIPELINES: [Pipeline; 3] = [
    Pipeline::StageCopy,
    Pipeline::TransformInsert,
    Pipeline::Deduplicate,
];

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("connection failed: {context}")]
    FailedToConnect {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    #[error("{pipeline} pipeline failed at statement {index}: {context}")]
    StatementFailed {
        pipeline: Pipeline,
        index: usize,
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    #[error("execution failed: {context}")]
    FailedToExecute {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    #[error("unexpected error: {context}")]
    UnexpectedError {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
    #[error("I/O error: {context}")]
    IoError {
        context: DiagnosticMessage,
        #[source]
        source: std::io::Error,
    },
}

impl ExecutorError {
    #[track_caller]
    pub fn failed_to_connect(err: DatabaseAdapterError) -> Self {
        Self::FailedToConnect {
            context: DiagnosticMessage::new(err.to_string()),
            source: Some(Box::new(err)),
        }
    }

    #[track_caller]
    pub fn statement_failed(pipeline: Pipeline, index: usize, err: DatabaseAdapterError) -> Self {
        Self::StatementFailed {
            pipeline,
            index,
            context: DiagnosticMessage::new(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<DatabaseAdapterError> for ExecutorError {
    #[track_caller]
    fn from(value: DatabaseAdapterError) -> Self {
        match value {
            DatabaseAdapterError::InvalidConnectionError { context } => {
                ExecutorError::FailedToConnect {
                    context,
                    source: None,
                }
            }
            DatabaseAdapterError::SyntaxError { context } => ExecutorError::FailedToExecute {
                context,
                source: None,
            },
            DatabaseAdapterError::UnexpectedError { context } => ExecutorError::UnexpectedError {
                context,
                source: None,
            },
            DatabaseAdapterError::IoError { context, source } => {
                ExecutorError::IoError { context, source }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub executed: Vec<(Pipeline, usize)>,
}

impl PipelineReport {
    pub fn statements(&self) -> usize {
        self.executed.iter().map(|(_, count)| count).sum()
    }

    pub fn pipelines(&self) -> Vec<Pipeline> {
        self.executed.iter().map(|(pipeline, _)| *pipeline).collect()
    }

    pub fn merge(&mut self, other: PipelineReport) {
        self.executed.extend(other.executed);
    }
}

/// Runs the statement pipelines one statement at a time. Every statement is
/// committed on its own, so a failure leaves the earlier ones in place.
pub struct EtlExecutor<A> {
    adapter: A,
    catalog: SqlCatalog,
}

impl<A> EtlExecutor<A>
where
    A: AsyncDatabaseAdapter,
{
    pub fn new(adapter: A, catalog: SqlCatalog) -> Self {
        Self { adapter, catalog }
    }

    pub fn catalog(&self) -> &SqlCatalog {
        &self.catalog
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    pub async fn run_pipeline(
        &mut self,
        pipeline: Pipeline,
    ) -> Result<PipelineReport, ExecutorError> {
        let statements = self.catalog.statements(pipeline);
        info!("Running {} pipeline ({} statements)", pipeline, statements.len());

        for (index, statement) in statements.iter().enumerate() {
            debug!("Query being executed: {}", statement.trim());
            if let Err(err) = self.adapter.execute(statement).await {
                error!("{pipeline} pipeline stopped at statement {index}: {err}");
                return Err(ExecutorError::statement_failed(pipeline, index, err));
            }
        }

        info!("{} pipeline done", pipeline);
        Ok(PipelineReport {
            executed: vec![(pipeline, statements.len())],
        })
    }

    pub async fn run_pipelines(
        &mut self,
        pipelines: &[Pipeline],
    ) -> Result<PipelineReport, ExecutorError> {
        let mut report = PipelineReport::default();
        for pipeline in pipelines {
            report.merge(self.run_pipeline(*pipeline).await?);
        }
        Ok(report)
    }

    /// Drop every table, then create them again.
    pub async fn recreate_tables(&mut self) -> Result<PipelineReport, ExecutorError> {
        let report = self.run_pipelines(&RECREATE_PIPELINES).await?;
        info!("Tables dropped and created.");
        Ok(report)
    }

    /// Load the staging tables, fill the star schema and deduplicate it.
    pub async fn run_etl(&mut self) -> Result<PipelineReport, ExecutorError> {
        let report = self.run_pipelines(&ETL_PIPELINES).await?;
        info!("Staging tables loaded and star schema populated.");
        Ok(report)
    }

    pub async fn run_all(&mut self) -> Result<PipelineReport, ExecutorError> {
        let mut report = self.recreate_tables().await?;
        report.merge(self.run_etl().await?);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{CopySources, DEDUP_ARTISTS_STATEMENTS, DROP_STATEMENTS};
    use test_utils::RecordingAdapter;

    fn catalog() -> SqlCatalog {
        SqlCatalog::new(CopySources {
            log_data: "'s3://bucket/log_data'".into(),
            log_jsonpath: "'s3://bucket/log_json_path.json'".into(),
            song_data: "'s3://bucket/song_data'".into(),
            region: "us-west-2".into(),
            role_arn: "arn:aws:iam::123456789012:role/dwhRole".into(),
        })
    }

    #[tokio::test]
    async fn run_all_executes_every_pipeline_in_order() {
        let mut executor = EtlExecutor::new(RecordingAdapter::new(), catalog());
        let report = executor.run_all().await.unwrap();

        assert_eq!(
            report.pipelines(),
            vec![
                Pipeline::Drop,
                Pipeline::Create,
                Pipeline::StageCopy,
                Pipeline::TransformInsert,
                Pipeline::Deduplicate,
            ]
        );
        assert_eq!(report.statements(), 7 + 7 + 2 + 5 + 8);

        let statements = executor.into_adapter().statements();
        assert_eq!(statements.len(), report.statements());
        assert_eq!(statements[0], DROP_STATEMENTS[0]);
        assert!(statements[14].contains("COPY staging_events"));
        assert_eq!(
            statements.last().map(String::as_str),
            Some(DEDUP_ARTISTS_STATEMENTS[3])
        );
    }

    #[tokio::test]
    async fn recreate_tables_drops_before_creating() {
        let mut executor = EtlExecutor::new(RecordingAdapter::new(), catalog());
        executor.recreate_tables().await.unwrap();

        let statements = executor.into_adapter().statements();
        assert_eq!(statements.len(), 14);
        assert!(statements[..7].iter().all(|s| s.starts_with("DROP TABLE")));
        assert!(statements[7..].iter().all(|s| s.contains("CREATE TABLE")));
    }

    #[tokio::test]
    async fn first_failure_aborts_and_keeps_earlier_statements() {
        let adapter = RecordingAdapter::failing_on("INSERT INTO songs");
        let mut executor = EtlExecutor::new(adapter, catalog());

        let err = executor.run_etl().await.expect_err("injected failure");
        match err {
            ExecutorError::StatementFailed {
                pipeline, index, ..
            } => {
                assert_eq!(pipeline, Pipeline::TransformInsert);
                assert_eq!(index, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        let statements = executor.into_adapter().statements();
        // two copies, then songplays, users and the failing songs insert
        assert_eq!(statements.len(), 5);
        assert!(!statements.iter().any(|s| s.contains("temp_users")));
    }
}
