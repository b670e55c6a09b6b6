//! ScyllaDB schema creation

use crate::error::PersistenceError;
use scylla::Session;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    // Session context. No TTL: retention is handled outside the router.
    let sessions_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.sessions (
            session_id TEXT,
            service_type TEXT,
            location TEXT,
            user_intent TEXT,
            updated_at BIGINT,
            PRIMARY KEY (session_id)
        )
    "#,
        keyspace
    );

    session.query_unpaged(sessions_table, &[]).await.map_err(|e| {
        PersistenceError::SchemaError(format!("Failed to create sessions table: {}", e))
    })?;

    // Append-only routing log, one row per routed message
    let chat_logs_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.chat_logs (
            partition_date TEXT,
            actor_id TEXT,
            timestamp BIGINT,
            id UUID,
            query TEXT,
            response TEXT,
            source TEXT,
            PRIMARY KEY ((partition_date, actor_id), timestamp, id)
        ) WITH CLUSTERING ORDER BY (timestamp DESC, id DESC)
    "#,
        keyspace
    );

    session.query_unpaged(chat_logs_table, &[]).await.map_err(|e| {
        PersistenceError::SchemaError(format!("Failed to create chat_logs table: {}", e))
    })?;

    tracing::info!("All tables created successfully");
    Ok(())
}
