use sqlx::PgPool;

/// Connect, migrate, verify both board tables exist and start empty.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    boardtrack_db::health_check(&pool).await.unwrap();

    for table in ["boards", "board_history"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// Malformed production dates are rejected by the schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_creation_date_format_enforced(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO boards (namespace, serial_number, board_name, technician,
                             creation_date, created_by, updated_by)
         VALUES ('ns', 'SN-1', 'x', 'y', '2024/03/05', 'a', 'a')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}
