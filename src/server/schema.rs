use super::app_state::DbPool;

const TABLES: [&str; 3] = [
    r#"CREATE TABLE IF NOT EXISTS Level (
        lid INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        nodes INTEGER NOT NULL,
        edges INTEGER NOT NULL,
        optimal_cost INTEGER NOT NULL,
        difficulty REAL NOT NULL,
        data TEXT NOT NULL,
        UNIQUE (name, created_at)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS Highscore (
        hid INTEGER PRIMARY KEY AUTOINCREMENT,
        player TEXT NOT NULL,
        score INTEGER NOT NULL,
        submitted_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"#,
    r#"CREATE TABLE IF NOT EXISTS Solution (
        sid INTEGER PRIMARY KEY AUTOINCREMENT,
        level_lid INTEGER NOT NULL REFERENCES Level(lid) ON DELETE CASCADE,
        player TEXT NOT NULL,
        cost INTEGER NOT NULL,
        solved INTEGER NOT NULL,
        solution_hash TEXT NOT NULL,
        data TEXT NOT NULL,
        UNIQUE (level_lid, player, solution_hash)
    )"#,
];

/// Creates missing tables; safe to run on every start.
pub async fn create_schema(db: &DbPool) -> sqlx::Result<()> {
    for statement in TABLES {
        sqlx::query(statement).execute(db).await?;
    }
    Ok(())
}
