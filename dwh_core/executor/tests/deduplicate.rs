use executor::sql::tables::{ARTISTS_CREATE, USERS_CREATE};
use executor::sql::{CopySources, Pipeline, SqlCatalog};
use executor::EtlExecutor;
use shared_clients::{create_db_adapter, AsyncDatabaseAdapter};
use test_utils::setup_postgres;

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
#[ignore = "requires a docker daemon"]
async fn deduplicate_leaves_one_row_per_key_even_when_columns_differ(
) -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres().await?;
    let mut adapter = create_db_adapter(&pg.connection_details()).await?;

    adapter.execute(USERS_CREATE).await?;
    adapter.execute(ARTISTS_CREATE).await?;
    adapter
        .execute(
            "INSERT INTO users VALUES
                (1, 'Ada', 'Lovelace', 'F', 'paid'),
                (1, 'Ada', 'Lovelace', 'F', 'paid'),
                (2, 'Alan', 'Turing', 'M', 'free'),
                (2, 'Alan', 'Turing', 'M', 'paid'),
                (2, 'Alan', 'Turing', 'M', 'paid'),
                (3, 'Grace', 'Hopper', 'F', 'free');",
        )
        .await?;
    adapter
        .execute(
            "INSERT INTO artists VALUES
                ('AR1', 'Nina Simone', 'Tryon', '35.2', '-82.2'),
                ('AR1', 'Nina Simone', 'Tryon', '35.2', '-82.2'),
                ('AR2', 'Miles Davis', 'Alton', NULL, NULL),
                ('AR2', 'Miles Davis', NULL, NULL, NULL);",
        )
        .await?;

    let mut executor = EtlExecutor::new(adapter, catalog());
    let report = executor.run_pipeline(Pipeline::Deduplicate).await?;
    assert_eq!(report.statements(), 8);

    let adapter = executor.into_adapter();
    for (table, key, distinct) in [("users", "user_id", 3i64), ("artists", "artist_id", 2i64)] {
        let rows = adapter
            .query(&format!(
                "SELECT COUNT(*), COUNT(DISTINCT {key}) FROM {table}"
            ))
            .await?;
        let total: i64 = rows[0].get(0);
        let keys: i64 = rows[0].get(1);
        assert_eq!(total, distinct, "{table} still has duplicates");
        assert_eq!(keys, distinct);
    }

    let level = adapter
        .query("SELECT level FROM users WHERE user_id = 2")
        .await?;
    assert_eq!(level.len(), 1);
    assert_eq!(level[0].get::<_, String>(0), "paid");

    let location = adapter
        .query("SELECT location FROM artists WHERE artist_id = 'AR2'")
        .await?;
    assert_eq!(location.len(), 1);
    assert_eq!(location[0].get::<_, Option<String>>(0).as_deref(), Some("Alton"));

    let leftovers = adapter
        .query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_name IN ('temp_users', 'temp_artists')",
        )
        .await?;
    assert!(leftovers.is_empty(), "temp tables were not renamed away");

    Ok(())
}
