use crate::{AsyncDatabaseAdapter, DatabaseAdapterError};
use async_trait::async_trait;
use common::config::components::connections::ConnectionDetails;
use log::{debug, error};
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Config, Error, NoTls, Row};

impl From<Error> for DatabaseAdapterError {
    #[track_caller]
    fn from(err: Error) -> Self {
        let Some(e) = err.as_db_error() else {
            return DatabaseAdapterError::unexpected(err.to_string());
        };

        let code = e.code();
        if [
            SqlState::CONNECTION_DOES_NOT_EXIST,
            SqlState::CONNECTION_FAILURE,
            SqlState::INVALID_PASSWORD,
            SqlState::INVALID_AUTHORIZATION_SPECIFICATION,
        ]
        .contains(code)
        {
            DatabaseAdapterError::invalid_connection(e.to_string())
        } else if *code == SqlState::SYNTAX_ERROR {
            DatabaseAdapterError::syntax(e.to_string())
        } else if *code == SqlState::IO_ERROR {
            DatabaseAdapterError::from(std::io::Error::other(e.to_string()))
        } else {
            DatabaseAdapterError::unexpected(e.to_string())
        }
    }
}

/// Connection parameters set field by field, so credentials need no quoting.
pub fn pg_config(conn_details: &ConnectionDetails) -> Config {
    let mut config = Config::new();
    config
        .host(&conn_details.host)
        .port(conn_details.port)
        .user(&conn_details.user)
        .password(&conn_details.password)
        .dbname(&conn_details.database);
    config
}

/// Warehouse connection over the Postgres wire protocol, which Redshift
/// speaks natively.
pub struct PostgresAdapter {
    client: Client,
    _driver: tokio::task::JoinHandle<()>, // keep the connection task alive
}

impl PostgresAdapter {
    /// Connect and spawn the connection driver in the background.
    pub async fn new(conn_details: &ConnectionDetails) -> Result<Self, DatabaseAdapterError> {
        debug!(
            "connecting to {}:{}/{} as {}",
            conn_details.host, conn_details.port, conn_details.database, conn_details.user
        );
        let (client, connection) = pg_config(conn_details).connect(NoTls).await?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("warehouse connection closed with error: {e}");
            }
        });

        Ok(Self {
            client,
            _driver: driver,
        })
    }
}

#[async_trait]
impl AsyncDatabaseAdapter for PostgresAdapter {
    type Row = Row;

    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseAdapterError> {
        // simple-query protocol: autocommits unless the text opens a transaction
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<Vec<Self::Row>, DatabaseAdapterError> {
        Ok(self.client.query(sql, &[]).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_postgres::config::Host;

    #[test]
    fn passwords_with_spaces_and_quotes_survive() {
        let details = ConnectionDetails::new(
            "cl-sparkify.abc123xyz.us-west-2.redshift.amazonaws.com",
            5439,
            "dwh",
            "dwhuser",
            "pa ss'word=1",
        );
        let config = pg_config(&details);

        assert_eq!(config.get_password(), Some("pa ss'word=1".as_bytes()));
        assert_eq!(config.get_user(), Some("dwhuser"));
        assert_eq!(config.get_dbname(), Some("dwh"));
        assert_eq!(config.get_ports(), &[5439]);
        assert!(matches!(
            config.get_hosts(),
            [Host::Tcp(host)] if host == "cl-sparkify.abc123xyz.us-west-2.redshift.amazonaws.com"
        ));
    }
}
