use rusqlite::Connection;

/// Create the store's tables if they do not exist yet
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS diagrams (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            graph       TEXT NOT NULL,
            is_public   INTEGER NOT NULL DEFAULT 0,
            public_id   TEXT UNIQUE,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS versions (
            seq         INTEGER PRIMARY KEY AUTOINCREMENT,
            id          TEXT NOT NULL UNIQUE,
            diagram_id  TEXT NOT NULL REFERENCES diagrams(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            timestamp   TEXT NOT NULL,
            graph       TEXT NOT NULL,
            created_by  TEXT NOT NULL
        );

        DROP INDEX IF EXISTS versions_by_diagram;
        CREATE INDEX IF NOT EXISTS versions_by_diagram_seq
            ON versions (diagram_id, seq DESC);",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('diagrams', 'versions')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
