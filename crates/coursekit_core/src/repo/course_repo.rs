//! Course repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and paged listing over `courses` storage.
//! - Keep the case-folded `title_key` column in sync with `title`.
//!
//! # Invariants
//! - Listing is deterministic: `created_at DESC`, newest insert first on ties.
//! - `update_course` refreshes `updated_at` on every successful write.
//! - Reads reject invalid persisted state instead of masking it.

use crate::db::now_epoch_ms;
use crate::model::course::{Course, CourseId, CourseStatus};
use crate::model::title::title_search_key;
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_is_deleted, parse_uuid, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const COURSE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    status,
    is_deleted,
    created_at,
    updated_at
FROM courses";

const COURSE_COLUMNS: &[&str] = &[
    "uuid",
    "title",
    "title_key",
    "status",
    "is_deleted",
    "created_at",
    "updated_at",
];

/// Filter and window for course listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseListQuery {
    /// Case-insensitive substring on title. Matched against the folded key.
    pub title_contains: Option<String>,
    pub status: Option<CourseStatus>,
    pub limit: u32,
    pub offset: u64,
}

/// One window of courses plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListing {
    pub items: Vec<Course>,
    pub total_count: u64,
}

/// Repository interface for course persistence.
pub trait CourseRepository {
    fn create_course(&self, course: &Course) -> RepoResult<CourseId>;
    /// Rewrites title, status and tombstone of a live course.
    ///
    /// Returns the stored row with its refreshed `updated_at`.
    fn update_course(&self, course: &Course) -> RepoResult<Course>;
    fn get_course(&self, id: CourseId, include_deleted: bool) -> RepoResult<Option<Course>>;
    fn list_courses(&self, query: &CourseListQuery) -> RepoResult<CourseListing>;
    fn soft_delete_course(&self, id: CourseId) -> RepoResult<()>;
}

/// SQLite-backed course repository.
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "courses", COURSE_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, course: &Course) -> RepoResult<CourseId> {
        course.validate()?;

        self.conn.execute(
            "INSERT INTO courses (
                uuid,
                title,
                title_key,
                status,
                is_deleted,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                course.uuid.to_string(),
                course.title.as_str(),
                title_search_key(&course.title),
                course_status_to_db(course.status),
                bool_to_int(course.is_deleted),
                course.created_at,
                course.updated_at,
            ],
        )?;

        Ok(course.uuid)
    }

    fn update_course(&self, course: &Course) -> RepoResult<Course> {
        course.validate()?;

        let changed = self.conn.execute(
            "UPDATE courses
             SET
                title = ?2,
                title_key = ?3,
                status = ?4,
                is_deleted = ?5,
                updated_at = ?6
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![
                course.uuid.to_string(),
                course.title.as_str(),
                title_search_key(&course.title),
                course_status_to_db(course.status),
                bool_to_int(course.is_deleted),
                now_epoch_ms().max(course.created_at),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::CourseNotFound(course.uuid));
        }

        self.get_course(course.uuid, true)?
            .ok_or(RepoError::CourseNotFound(course.uuid))
    }

    fn get_course(&self, id: CourseId, include_deleted: bool) -> RepoResult<Option<Course>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COURSE_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_course_row(row)?));
        }

        Ok(None)
    }

    fn list_courses(&self, query: &CourseListQuery) -> RepoResult<CourseListing> {
        let mut filter_sql = String::from(" WHERE is_deleted = 0");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(needle) = query.title_contains.as_deref() {
            filter_sql.push_str(" AND instr(title_key, ?) > 0");
            bind_values.push(Value::Text(title_search_key(needle)));
        }

        if let Some(status) = query.status {
            filter_sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(course_status_to_db(status).to_string()));
        }

        // Count and window read one snapshot.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;

        let total_count: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM courses{filter_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let offset = i64::try_from(query.offset).map_err(|_| {
            RepoError::InvalidData(format!("course list offset {} out of range", query.offset))
        })?;
        let mut page_values = bind_values;
        page_values.push(Value::Integer(i64::from(query.limit)));
        page_values.push(Value::Integer(offset));

        let mut items = Vec::new();
        {
            let mut stmt = tx.prepare(&format!(
                "{COURSE_SELECT_SQL}{filter_sql}
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ? OFFSET ?;"
            ))?;
            let mut rows = stmt.query(params_from_iter(page_values))?;
            while let Some(row) = rows.next()? {
                items.push(parse_course_row(row)?);
            }
        }
        tx.commit()?;

        Ok(CourseListing {
            items,
            total_count: u64::try_from(total_count).unwrap_or(0),
        })
    }

    fn soft_delete_course(&self, id: CourseId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE courses
             SET
                is_deleted = 1,
                updated_at = MAX(?2, created_at)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![id.to_string(), now_epoch_ms()],
        )?;

        if changed == 0 {
            return Err(RepoError::CourseNotFound(id));
        }

        Ok(())
    }
}

fn parse_course_row(row: &Row<'_>) -> RepoResult<Course> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "courses.uuid")?;

    let status_text: String = row.get("status")?;
    let status = parse_course_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid course status `{status_text}` in courses.status"
        ))
    })?;

    let course = Course {
        uuid,
        title: row.get("title")?,
        status,
        is_deleted: parse_is_deleted(row.get("is_deleted")?, "courses.is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    course.validate()?;
    Ok(course)
}

fn course_status_to_db(status: CourseStatus) -> &'static str {
    match status {
        CourseStatus::Draft => "draft",
        CourseStatus::Published => "published",
    }
}

fn parse_course_status(value: &str) -> Option<CourseStatus> {
    match value {
        "draft" => Some(CourseStatus::Draft),
        "published" => Some(CourseStatus::Published),
        _ => None,
    }
}
