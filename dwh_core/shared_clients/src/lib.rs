pub mod aws;
pub mod postgres;

use crate::postgres::PostgresAdapter;
use async_trait::async_trait;
use common::config::components::connections::ConnectionDetails;
use common::error::diagnostics::DiagnosticMessage;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseAdapterError {
    #[error("invalid connection details: {context}")]
    InvalidConnectionError { context: DiagnosticMessage },
    #[error("SQL syntax error: {context}")]
    SyntaxError { context: DiagnosticMessage },
    #[error("unexpected database error: {context}")]
    UnexpectedError { context: DiagnosticMessage },
    #[error("I/O error: {context}")]
    IoError {
        context: DiagnosticMessage,
        #[source]
        source: std::io::Error,
    },
}

impl DatabaseAdapterError {
    #[track_caller]
    pub fn invalid_connection(message: impl Into<String>) -> Self {
        Self::InvalidConnectionError {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::SyntaxError {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedError {
            context: DiagnosticMessage::new(message.into()),
        }
    }
}

impl From<std::io::Error> for DatabaseAdapterError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        let message = err.to_string();
        DatabaseAdapterError::IoError {
            context: DiagnosticMessage::new(message),
            source: err,
        }
    }
}

/// A warehouse connection. `execute` runs one statement and commits it
/// before returning; there is no surrounding transaction.
#[async_trait]
pub trait AsyncDatabaseAdapter: Send + Sync {
    type Row: Send + 'static;
    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseAdapterError>;
    async fn query(&self, sql: &str) -> Result<Vec<Self::Row>, DatabaseAdapterError>;
}

#[async_trait]
impl<T> AsyncDatabaseAdapter for Box<T>
where
    T: AsyncDatabaseAdapter + ?Sized,
{
    type Row = T::Row;

    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseAdapterError> {
        (**self).execute(sql).await
    }

    async fn query(&self, sql: &str) -> Result<Vec<Self::Row>, DatabaseAdapterError> {
        (**self).query(sql).await
    }
}

pub type AsyncDbAdapter =
    Box<dyn AsyncDatabaseAdapter<Row = tokio_postgres::Row> + Send + Sync + 'static>;

pub async fn create_db_adapter(
    conn_details: &ConnectionDetails,
) -> Result<AsyncDbAdapter, DatabaseAdapterError> {
    Ok(Box::new(PostgresAdapter::new(conn_details).await?))
}

/// Opens warehouse connections once the cluster endpoint is known.
#[async_trait]
pub trait AdapterFactory: Send + Sync {
    async fn connect(
        &self,
        conn_details: &ConnectionDetails,
    ) -> Result<AsyncDbAdapter, DatabaseAdapterError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresAdapterFactory;

#[async_trait]
impl AdapterFactory for PostgresAdapterFactory {
    async fn connect(
        &self,
        conn_details: &ConnectionDetails,
    ) -> Result<AsyncDbAdapter, DatabaseAdapterError> {
        create_db_adapter(conn_details).await
    }
}
