use crate::Database;
use crate::models::{CommentRow, DepartmentRow, TicketRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;
use rusqlite::types::ToSql;

/// Filter for ticket listings. Unset fields are not constrained; the
/// scoped views (mine/department/support) each set exactly one of them.
#[derive(Debug, Default, Clone)]
pub struct TicketFilter {
    pub created_by: Option<i64>,
    pub department_id: Option<i64>,
    pub assigned_support_id: Option<i64>,
    pub status: Option<String>,
    pub sort_by_priority: bool,
}

const TICKET_SELECT: &str = "SELECT t.id, t.title, t.description, t.status, t.priority,
            t.created_by_user_id, t.assigned_department_id, d.name,
            t.assigned_support_id, t.created_at, t.updated_at
     FROM tickets t
     JOIN departments d ON t.assigned_department_id = d.id";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role_id: i64,
        department_id: Option<i64>,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (email, password_hash, role_id, department_id)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![email, password_hash, role_id, department_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "u.email = ?1", &[&email]))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "u.id = ?1", &[&id]))
    }

    /// Returns false when no such user exists.
    pub fn update_user_password(&self, user_id: i64, password_hash: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                rusqlite::params![password_hash, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Reference data --

    pub fn get_role_id(&self, name: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT id FROM roles WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    /// Department names in seed order; the first entry is the default
    /// routing target when no better guess exists.
    pub fn list_department_names(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM departments ORDER BY id")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(names)
        })
    }

    pub fn get_department_by_name(&self, name: &str) -> Result<Option<DepartmentRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name FROM departments WHERE name = ?1",
                [name],
                |row| {
                    Ok(DepartmentRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
        })
    }

    // -- Tickets --

    pub fn insert_ticket(
        &self,
        title: &str,
        description: &str,
        priority: &str,
        created_by_user_id: i64,
        assigned_department_id: i64,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO tickets (title, description, status, priority,
                                      created_by_user_id, assigned_department_id)
                 VALUES (?1, ?2, 'Open', ?3, ?4, ?5)",
                rusqlite::params![
                    title,
                    description,
                    priority,
                    created_by_user_id,
                    assigned_department_id
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_ticket(&self, id: i64) -> Result<Option<TicketRow>> {
        self.with_conn(|conn| {
            let sql = format!("{} WHERE t.id = ?1", TICKET_SELECT);
            conn.query_row(&sql, [id], map_ticket_row).optional()
        })
    }

    pub fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<TicketRow>> {
        self.with_conn(|conn| {
            let mut sql = TICKET_SELECT.to_string();
            let mut clauses: Vec<&str> = Vec::new();
            let mut params: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(creator) = filter.created_by {
                clauses.push("t.created_by_user_id = ?");
                params.push(Box::new(creator));
            }
            if let Some(department_id) = filter.department_id {
                clauses.push("t.assigned_department_id = ?");
                params.push(Box::new(department_id));
            }
            if let Some(support_id) = filter.assigned_support_id {
                clauses.push("t.assigned_support_id = ?");
                params.push(Box::new(support_id));
            }
            if let Some(status) = &filter.status {
                clauses.push("t.status = ?");
                params.push(Box::new(status.clone()));
            }

            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }

            // High before Medium before Low before anything else; the id
            // tiebreak keeps ties in insertion order.
            if filter.sort_by_priority {
                sql.push_str(
                    " ORDER BY CASE t.priority
                           WHEN 'High' THEN 1
                           WHEN 'Medium' THEN 2
                           WHEN 'Low' THEN 3
                           ELSE 4
                       END, t.id",
                );
            } else {
                sql.push_str(" ORDER BY t.id");
            }

            let mut stmt = conn.prepare(&sql)?;
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = stmt
                .query_map(param_refs.as_slice(), map_ticket_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when the ticket does not exist.
    pub fn update_ticket_status(&self, ticket_id: i64, status: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE tickets SET status = ?1, updated_at = datetime('now')
                 WHERE id = ?2",
                rusqlite::params![status, ticket_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Assignment forces the ticket into In Progress regardless of its
    /// prior status. Idempotent under repeated assignment.
    pub fn assign_support(&self, ticket_id: i64, support_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE tickets
                 SET assigned_support_id = ?1, status = 'In Progress',
                     updated_at = datetime('now')
                 WHERE id = ?2",
                rusqlite::params![support_id, ticket_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Re-routing a ticket sends it back to Open.
    pub fn assign_department(&self, ticket_id: i64, department_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE tickets
                 SET assigned_department_id = ?1, status = 'Open',
                     updated_at = datetime('now')
                 WHERE id = ?2",
                rusqlite::params![department_id, ticket_id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, ticket_id: i64, user_id: i64, content: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO comments (ticket_id, user_id, content) VALUES (?1, ?2, ?3)",
                rusqlite::params![ticket_id, user_id, content],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Batch-fetch comments for a set of ticket IDs, oldest first.
    pub fn get_comments_for_tickets(&self, ticket_ids: &[i64]) -> Result<Vec<CommentRow>> {
        if ticket_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=ticket_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, ticket_id, user_id, content, created_at
                 FROM comments WHERE ticket_id IN ({})
                 ORDER BY created_at, id",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn ToSql> = ticket_ids.iter().map(|id| id as &dyn ToSql).collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        ticket_id: row.get(1)?,
                        user_id: row.get(2)?,
                        content: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, clause: &str, params: &[&dyn ToSql]) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT u.id, u.email, u.password_hash, r.name, u.department_id, d.name, u.created_at
         FROM users u
         JOIN roles r ON u.role_id = r.id
         LEFT JOIN departments d ON u.department_id = d.id
         WHERE {}",
        clause
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row(params, |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password_hash: row.get(2)?,
                role: row.get(3)?,
                department_id: row.get(4)?,
                department: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_ticket_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TicketRow> {
    Ok(TicketRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        priority: row.get(4)?,
        created_by_user_id: row.get(5)?,
        assigned_department_id: row.get(6)?,
        department: row.get(7)?,
        assigned_support_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
