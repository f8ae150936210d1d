//! Lesson repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, listing, and batch order writes over `lessons` storage.
//! - Surface unique-index rejections on `(course_uuid, sort_order)` as
//!   `RepoError::ConstraintViolation`.
//!
//! # Invariants
//! - Only live (`is_deleted=0`) lessons are returned by default.
//! - Lesson listing is deterministic: `sort_order ASC, uuid ASC`.
//! - `update_lesson_orders` commits every row or none and touches only
//!   `sort_order` and `updated_at`.
//! - `course_uuid` is never rewritten after insert.

use crate::db::now_epoch_ms;
use crate::model::course::CourseId;
use crate::model::lesson::{Lesson, LessonId};
use crate::repo::{
    bool_to_int, constraint_kind, ensure_connection_ready, parse_is_deleted, parse_uuid,
    ConstraintKind, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const LESSON_SELECT_SQL: &str = "SELECT
    uuid,
    course_uuid,
    title,
    sort_order,
    is_deleted,
    created_at,
    updated_at
FROM lessons";

const LESSON_COLUMNS: &[&str] = &[
    "uuid",
    "course_uuid",
    "title",
    "sort_order",
    "is_deleted",
    "created_at",
    "updated_at",
];

/// Repository interface for lesson persistence.
pub trait LessonRepository {
    /// Inserts one lesson. The owning course row must exist.
    fn create_lesson(&self, lesson: &Lesson) -> RepoResult<LessonId>;
    /// Rewrites title, order and tombstone of one live lesson.
    ///
    /// Returns the stored row with its refreshed `updated_at`.
    fn update_lesson(&self, lesson: &Lesson) -> RepoResult<Lesson>;
    /// Moves several live lessons of one course to new orders as one atomic
    /// commit. Titles and tombstones are left as stored.
    fn update_lesson_orders(&self, course_uuid: CourseId, orders: &[(LessonId, i64)])
        -> RepoResult<()>;
    fn get_lesson(&self, id: LessonId, include_deleted: bool) -> RepoResult<Option<Lesson>>;
    /// Lists lessons of one course ordered by `sort_order`.
    fn list_lessons(&self, course_uuid: CourseId, include_deleted: bool)
        -> RepoResult<Vec<Lesson>>;
    fn count_live_lessons(&self, course_uuid: CourseId) -> RepoResult<u64>;
    /// Returns whether a live lesson other than `exclude` holds `sort_order`.
    fn is_order_taken(
        &self,
        course_uuid: CourseId,
        sort_order: i64,
        exclude: Option<LessonId>,
    ) -> RepoResult<bool>;
    fn soft_delete_lesson(&self, id: LessonId) -> RepoResult<()>;
}

/// SQLite-backed lesson repository.
pub struct SqliteLessonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLessonRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "lessons", LESSON_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl LessonRepository for SqliteLessonRepository<'_> {
    fn create_lesson(&self, lesson: &Lesson) -> RepoResult<LessonId> {
        lesson.validate()?;

        self.conn
            .execute(
                "INSERT INTO lessons (
                    uuid,
                    course_uuid,
                    title,
                    sort_order,
                    is_deleted,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    lesson.uuid.to_string(),
                    lesson.course_uuid.to_string(),
                    lesson.title.as_str(),
                    lesson.sort_order,
                    bool_to_int(lesson.is_deleted),
                    lesson.created_at,
                    lesson.updated_at,
                ],
            )
            .map_err(|err| map_write_error(err, lesson.course_uuid, lesson.sort_order))?;

        Ok(lesson.uuid)
    }

    fn update_lesson(&self, lesson: &Lesson) -> RepoResult<Lesson> {
        lesson.validate()?;
        write_lesson(self.conn, lesson, now_epoch_ms())?;
        load_lesson(self.conn, lesson.uuid, true)?.ok_or(RepoError::LessonNotFound(lesson.uuid))
    }

    fn update_lesson_orders(
        &self,
        course_uuid: CourseId,
        orders: &[(LessonId, i64)],
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let now = now_epoch_ms();
        {
            let mut stmt = tx.prepare(
                "UPDATE lessons
                 SET
                    sort_order = ?3,
                    updated_at = MAX(?4, created_at)
                 WHERE uuid = ?1
                   AND course_uuid = ?2
                   AND is_deleted = 0;",
            )?;
            for (lesson_uuid, sort_order) in orders {
                let changed = stmt
                    .execute(params![
                        lesson_uuid.to_string(),
                        course_uuid.to_string(),
                        sort_order,
                        now,
                    ])
                    .map_err(|err| map_write_error(err, course_uuid, *sort_order))?;
                if changed == 0 {
                    return Err(RepoError::LessonNotFound(*lesson_uuid));
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn get_lesson(&self, id: LessonId, include_deleted: bool) -> RepoResult<Option<Lesson>> {
        load_lesson(self.conn, id, include_deleted)
    }

    fn list_lessons(
        &self,
        course_uuid: CourseId,
        include_deleted: bool,
    ) -> RepoResult<Vec<Lesson>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LESSON_SELECT_SQL}
             WHERE course_uuid = ?1
               AND (?2 = 1 OR is_deleted = 0)
             ORDER BY sort_order ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query(params![
            course_uuid.to_string(),
            bool_to_int(include_deleted)
        ])?;
        let mut lessons = Vec::new();
        while let Some(row) = rows.next()? {
            lessons.push(parse_lesson_row(row)?);
        }
        Ok(lessons)
    }

    fn count_live_lessons(&self, course_uuid: CourseId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM lessons
             WHERE course_uuid = ?1
               AND is_deleted = 0;",
            [course_uuid.to_string()],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn is_order_taken(
        &self,
        course_uuid: CourseId,
        sort_order: i64,
        exclude: Option<LessonId>,
    ) -> RepoResult<bool> {
        let taken: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM lessons
                WHERE course_uuid = ?1
                  AND sort_order = ?2
                  AND is_deleted = 0
                  AND (?3 IS NULL OR uuid <> ?3)
            );",
            params![
                course_uuid.to_string(),
                sort_order,
                exclude.map(|id| id.to_string()),
            ],
            |row| row.get(0),
        )?;
        Ok(taken == 1)
    }

    fn soft_delete_lesson(&self, id: LessonId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE lessons
             SET
                is_deleted = 1,
                updated_at = MAX(?2, created_at)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![id.to_string(), now_epoch_ms()],
        )?;

        if changed == 0 {
            return Err(RepoError::LessonNotFound(id));
        }

        Ok(())
    }
}

fn write_lesson(conn: &Connection, lesson: &Lesson, now: i64) -> RepoResult<()> {
    let changed = conn
        .execute(
            "UPDATE lessons
             SET
                title = ?2,
                sort_order = ?3,
                is_deleted = ?4,
                updated_at = MAX(?5, created_at)
             WHERE uuid = ?1
               AND course_uuid = ?6
               AND is_deleted = 0;",
            params![
                lesson.uuid.to_string(),
                lesson.title.as_str(),
                lesson.sort_order,
                bool_to_int(lesson.is_deleted),
                now,
                lesson.course_uuid.to_string(),
            ],
        )
        .map_err(|err| map_write_error(err, lesson.course_uuid, lesson.sort_order))?;

    if changed == 0 {
        return Err(RepoError::LessonNotFound(lesson.uuid));
    }
    Ok(())
}

fn load_lesson(
    conn: &Connection,
    id: LessonId,
    include_deleted: bool,
) -> RepoResult<Option<Lesson>> {
    let row = conn
        .query_row(
            &format!(
                "{LESSON_SELECT_SQL}
                 WHERE uuid = ?1
                   AND (?2 = 1 OR is_deleted = 0);"
            ),
            params![id.to_string(), bool_to_int(include_deleted)],
            |row| Ok(parse_lesson_row(row)),
        )
        .optional()?;
    row.transpose()
}

fn map_write_error(err: rusqlite::Error, course_uuid: CourseId, sort_order: i64) -> RepoError {
    match constraint_kind(&err) {
        Some(ConstraintKind::Unique) => RepoError::ConstraintViolation {
            course_uuid,
            sort_order,
        },
        Some(ConstraintKind::ForeignKey) => RepoError::CourseNotFound(course_uuid),
        None => err.into(),
    }
}

fn parse_lesson_row(row: &Row<'_>) -> RepoResult<Lesson> {
    let uuid_text: String = row.get("uuid")?;
    let course_uuid_text: String = row.get("course_uuid")?;

    let lesson = Lesson {
        uuid: parse_uuid(&uuid_text, "lessons.uuid")?,
        course_uuid: parse_uuid(&course_uuid_text, "lessons.course_uuid")?,
        title: row.get("title")?,
        sort_order: row.get("sort_order")?,
        is_deleted: parse_is_deleted(row.get("is_deleted")?, "lessons.is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    lesson.validate()?;
    Ok(lesson)
}
