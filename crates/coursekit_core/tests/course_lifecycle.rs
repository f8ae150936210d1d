use coursekit_core::db::open_db_in_memory;
use coursekit_core::{
    CatalogError, CatalogErrorKind, CatalogQuery, CourseRepository, CourseService, CourseStatus,
    LessonRepository, LessonService, SqliteCourseRepository, SqliteLessonRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

type Courses<'conn> = CourseService<SqliteCourseRepository<'conn>, SqliteLessonRepository<'conn>>;
type Lessons<'conn> = LessonService<SqliteCourseRepository<'conn>, SqliteLessonRepository<'conn>>;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn services(conn: &Connection) -> (Courses<'_>, Lessons<'_>) {
    let courses = CourseService::new(
        SqliteCourseRepository::try_new(conn).unwrap(),
        SqliteLessonRepository::try_new(conn).unwrap(),
    );
    let lessons = LessonService::new(
        SqliteCourseRepository::try_new(conn).unwrap(),
        SqliteLessonRepository::try_new(conn).unwrap(),
    );
    (courses, lessons)
}

#[test]
fn new_course_starts_as_draft() {
    let conn = setup();
    let (courses, _) = services(&conn);

    let course = courses.create_course("  Rust   Basics ").unwrap();
    assert_eq!(course.status, CourseStatus::Draft);
    assert_eq!(course.title, "Rust Basics");
    assert!(!course.is_deleted);
}

#[test]
fn blank_course_title_is_rejected() {
    let conn = setup();
    let (courses, _) = services(&conn);

    let err = courses.create_course("   ").unwrap_err();
    assert!(matches!(err, CatalogError::InvalidTitle));
    assert_eq!(err.kind(), CatalogErrorKind::InvalidInput);
}

#[test]
fn publish_requires_a_live_lesson() {
    let conn = setup();
    let (courses, lessons) = services(&conn);
    let course = courses.create_course("C1").unwrap();

    let err = courses.publish(course.uuid).unwrap_err();
    assert!(matches!(err, CatalogError::NoLessons(id) if id == course.uuid));

    lessons.create_lesson(course.uuid, "L1", 1).unwrap();
    let published = courses.publish(course.uuid).unwrap();
    assert_eq!(published.status, CourseStatus::Published);

    let stored = SqliteCourseRepository::try_new(&conn)
        .unwrap()
        .get_course(course.uuid, false)
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, CourseStatus::Published);
}

#[test]
fn publish_ignores_deleted_lessons() {
    let conn = setup();
    let (courses, lessons) = services(&conn);
    let course = courses.create_course("Only tombstones").unwrap();
    let lesson = lessons.create_lesson(course.uuid, "L1", 1).unwrap();
    lessons.delete_lesson(lesson.uuid).unwrap();

    let err = courses.publish(course.uuid).unwrap_err();
    assert_eq!(err.kind(), CatalogErrorKind::NoLessons);
}

#[test]
fn publishing_twice_is_a_no_op() {
    let conn = setup();
    let (courses, lessons) = services(&conn);
    let course = courses.create_course("Twice").unwrap();
    lessons.create_lesson(course.uuid, "L1", 1).unwrap();

    let first = courses.publish(course.uuid).unwrap();
    let second = courses.publish(course.uuid).unwrap();
    assert_eq!(second.status, CourseStatus::Published);
    assert_eq!(second.updated_at, first.updated_at);
}

#[test]
fn unpublish_has_no_lesson_precondition() {
    let conn = setup();
    let (courses, lessons) = services(&conn);
    let course = courses.create_course("Back to draft").unwrap();
    let lesson = lessons.create_lesson(course.uuid, "L1", 1).unwrap();
    courses.publish(course.uuid).unwrap();
    lessons.delete_lesson(lesson.uuid).unwrap();

    let draft = courses.unpublish(course.uuid).unwrap();
    assert_eq!(draft.status, CourseStatus::Draft);

    let again = courses.unpublish(course.uuid).unwrap();
    assert_eq!(again.status, CourseStatus::Draft);
}

#[test]
fn deleting_last_lesson_keeps_course_published() {
    let conn = setup();
    let (courses, lessons) = services(&conn);
    let course = courses.create_course("Sticky").unwrap();
    let lesson = lessons.create_lesson(course.uuid, "L1", 1).unwrap();
    courses.publish(course.uuid).unwrap();

    lessons.delete_lesson(lesson.uuid).unwrap();

    let stored = SqliteCourseRepository::try_new(&conn)
        .unwrap()
        .get_course(course.uuid, false)
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, CourseStatus::Published);
}

#[test]
fn rename_updates_title_of_live_course() {
    let conn = setup();
    let (courses, _) = services(&conn);
    let course = courses.create_course("Old").unwrap();

    let renamed = courses.rename_course(course.uuid, "New  name").unwrap();
    assert_eq!(renamed.title, "New name");
    assert_eq!(renamed.status, CourseStatus::Draft);

    let err = courses.rename_course(course.uuid, "").unwrap_err();
    assert!(matches!(err, CatalogError::InvalidTitle));
}

#[test]
fn deleted_course_rejects_lifecycle_operations() {
    let conn = setup();
    let (courses, lessons) = services(&conn);
    let course = courses.create_course("Doomed").unwrap();
    lessons.create_lesson(course.uuid, "L1", 1).unwrap();

    courses.delete_course(course.uuid).unwrap();

    for err in [
        courses.publish(course.uuid).unwrap_err(),
        courses.unpublish(course.uuid).unwrap_err(),
        courses.rename_course(course.uuid, "Again").unwrap_err(),
        courses.delete_course(course.uuid).unwrap_err(),
    ] {
        assert!(matches!(err, CatalogError::CourseNotFound(id) if id == course.uuid));
    }
}

#[test]
fn deleting_course_does_not_cascade_to_lessons() {
    let conn = setup();
    let (courses, lessons) = services(&conn);
    let course = courses.create_course("Parent").unwrap();
    let lesson = lessons.create_lesson(course.uuid, "Child", 1).unwrap();

    courses.delete_course(course.uuid).unwrap();

    let stored = SqliteLessonRepository::try_new(&conn)
        .unwrap()
        .get_lesson(lesson.uuid, false)
        .unwrap()
        .unwrap();
    assert!(!stored.is_deleted);
    assert_eq!(stored.course_uuid, course.uuid);

    let query = CatalogQuery::new(
        SqliteCourseRepository::try_new(&conn).unwrap(),
        SqliteLessonRepository::try_new(&conn).unwrap(),
    );
    let listed = query.list_lessons(course.uuid).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].uuid, lesson.uuid);
    assert_eq!(lessons.get_lesson(lesson.uuid).unwrap().title, "Child");
}

#[test]
fn unknown_course_is_not_found() {
    let conn = setup();
    let (courses, _) = services(&conn);
    let ghost = Uuid::new_v4();

    let err = courses.publish(ghost).unwrap_err();
    assert!(matches!(err, CatalogError::CourseNotFound(id) if id == ghost));
    assert!(err.is_business());
    assert!(err.to_string().contains(&ghost.to_string()));
}
