use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS roles (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS departments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            email           TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            role_id         INTEGER NOT NULL REFERENCES roles(id),
            department_id   INTEGER REFERENCES departments(id),
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS tickets (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            title                   TEXT NOT NULL,
            description             TEXT NOT NULL,
            status                  TEXT NOT NULL DEFAULT 'Open',
            priority                TEXT NOT NULL DEFAULT 'Low',
            created_by_user_id      INTEGER NOT NULL REFERENCES users(id),
            assigned_department_id  INTEGER NOT NULL REFERENCES departments(id),
            assigned_support_id     INTEGER REFERENCES users(id),
            created_at              TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at              TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_tickets_creator
            ON tickets(created_by_user_id);
        CREATE INDEX IF NOT EXISTS idx_tickets_department
            ON tickets(assigned_department_id);
        CREATE INDEX IF NOT EXISTS idx_tickets_support
            ON tickets(assigned_support_id);

        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            ticket_id   INTEGER NOT NULL REFERENCES tickets(id) ON DELETE CASCADE,
            user_id     INTEGER NOT NULL REFERENCES users(id),
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_ticket
            ON comments(ticket_id, created_at);

        -- Seed the fixed roles and departments
        INSERT OR IGNORE INTO roles (name) VALUES
            ('student'), ('support'), ('department'), ('admin');

        INSERT OR IGNORE INTO departments (name) VALUES
            ('Bilgi Islem'), ('Yapi Isleri'), ('Ogrenci Isleri'), ('Akademik Danismanlik');
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
