use common::config::components::connections::ConnectionDetails;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use uuid::Uuid;

pub const PG_DB: &str = "postgres";
pub const PG_USER: &str = "postgres";
pub const PG_PASSWORD: &str = "postgres";
const PG_HOST: &str = "127.0.0.1";

/// Postgres stands in for the warehouse: the dedup and create/drop statements
/// only use syntax both engines accept.
pub struct PgTestContainer {
    pub container: ContainerAsync<GenericImage>,
    pub host: &'static str,
    pub port: u16,
}

impl PgTestContainer {
    pub fn connection_details(&self) -> ConnectionDetails {
        ConnectionDetails::new(self.host, self.port, PG_DB, PG_USER, PG_PASSWORD)
    }
}

pub async fn setup_postgres() -> Result<PgTestContainer, Box<dyn std::error::Error>> {
    let name = format!("dwh-postgres-{}", Uuid::new_v4());
    let postgres = GenericImage::new("postgres", "16")
        .with_wait_for(WaitFor::message_on_stdout(
            "database system is ready to accept connections",
        ))
        .with_container_name(&name)
        .with_env_var("POSTGRES_DB", PG_DB)
        .with_env_var("POSTGRES_USER", PG_USER)
        .with_env_var("POSTGRES_PASSWORD", PG_PASSWORD)
        .with_mapped_port(0, 5432u16.tcp())
        .start()
        .await?;

    let port = postgres.get_host_port_ipv4(5432).await?;

    Ok(PgTestContainer {
        container: postgres,
        host: PG_HOST,
        port,
    })
}
