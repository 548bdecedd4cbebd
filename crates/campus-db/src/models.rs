/// Raw row structs. Status and priority stay as the stored strings here;
/// the API layer converts them to the typed enums.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub department_id: Option<i64>,
    pub department: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct DepartmentRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TicketRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub created_by_user_id: i64,
    pub assigned_department_id: i64,
    pub department: String,
    pub assigned_support_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: i64,
    pub ticket_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: String,
}
