use rusqlite::Connection;

pub fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS analyses (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            tx_hash      TEXT NOT NULL,
            tx_height    INTEGER NOT NULL,
            tx_timestamp INTEGER NOT NULL,
            key_image    TEXT NOT NULL,
            ring_size    INTEGER NOT NULL,
            known_ages   INTEGER NOT NULL,
            analyzed_at  TEXT NOT NULL
        );

        -- NULL marks an unknown value
        CREATE TABLE IF NOT EXISTS ring_members (
            analysis_id      INTEGER NOT NULL REFERENCES analyses(id),
            position         INTEGER NOT NULL,
            global_index     INTEGER NOT NULL,
            out_height       INTEGER,
            out_timestamp    INTEGER,
            age_seconds      INTEGER,
            inv_age          REAL,
            norm_age         REAL,
            neglog           REAL,
            softmax_norm_age REAL,
            gnh_score        REAL,
            newest_rank      REAL,
            PRIMARY KEY (analysis_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_analyses_tx ON analyses(tx_hash);
        ",
    )?;
    Ok(())
}
