//! v002: FTS5 index over the searchable memory fields, kept consistent
//! with the base table by triggers (delete-then-insert on update).

use rusqlite::Connection;

use engram_core::errors::EngramResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> EngramResult<()> {
    conn.execute_batch(
        "
        CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
            content, structured, summary, tags, keywords,
            content='memories', content_rowid='id'
        );

        CREATE TRIGGER IF NOT EXISTS memories_fts_ai AFTER INSERT ON memories BEGIN
            INSERT INTO memories_fts(rowid, content, structured, summary, tags, keywords)
            VALUES (new.id, new.content, coalesce(new.structured, ''), new.summary, new.tags, new.keywords);
        END;

        CREATE TRIGGER IF NOT EXISTS memories_fts_ad AFTER DELETE ON memories BEGIN
            INSERT INTO memories_fts(memories_fts, rowid, content, structured, summary, tags, keywords)
            VALUES ('delete', old.id, old.content, coalesce(old.structured, ''), old.summary, old.tags, old.keywords);
        END;

        CREATE TRIGGER IF NOT EXISTS memories_fts_au AFTER UPDATE ON memories BEGIN
            INSERT INTO memories_fts(memories_fts, rowid, content, structured, summary, tags, keywords)
            VALUES ('delete', old.id, old.content, coalesce(old.structured, ''), old.summary, old.tags, old.keywords);
            INSERT INTO memories_fts(rowid, content, structured, summary, tags, keywords)
            VALUES (new.id, new.content, coalesce(new.structured, ''), new.summary, new.tags, new.keywords);
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
