//! 选课流程集成测试
//!
//! 在独立的 SQLite 临时库上走完整的导入/选课/退课路径。
//! 审批流转由管理端直接修改记录完成，测试里通过第二个数据库
//! 连接模拟这一外部操作。

use std::path::PathBuf;
use std::sync::Arc;

use sea_orm::{ActiveModelTrait, Database, EntityTrait, Set};

use rust_xksystem_next::config::AppConfig;
use rust_xksystem_next::entity::enrollments::{
    ActiveModel as EnrollmentActiveModel, Entity as Enrollments,
};
use rust_xksystem_next::errors::XKSystemError;
use rust_xksystem_next::models::courses::requests::CreateCourseRequest;
use rust_xksystem_next::models::enrollments::entities::EnrollmentStatus;
use rust_xksystem_next::models::users::entities::UserRole;
use rust_xksystem_next::models::users::requests::CreateUserRequest;
use rust_xksystem_next::storage::Storage;
use rust_xksystem_next::storage::sea_orm_storage::SeaOrmStorage;

struct TestContext {
    storage: Arc<dyn Storage>,
    db_url: String,
    db_path: PathBuf,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.db_path.clone();
            path.set_file_name(format!(
                "{}{}",
                self.db_path.file_name().unwrap().to_string_lossy(),
                suffix
            ));
            let _ = std::fs::remove_file(path);
        }
    }
}

async fn setup(name: &str) -> TestContext {
    let db_path = std::env::temp_dir().join(format!("xksystem_test_{name}.db"));
    let _ = std::fs::remove_file(&db_path);
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new_with_url(&db_url, AppConfig::get())
        .await
        .expect("storage init failed");

    TestContext {
        storage: Arc::new(storage),
        db_url,
        db_path,
    }
}

fn course_draft(code: &str, name: &str, capacity: i32, time_slot: &str) -> CreateCourseRequest {
    CreateCourseRequest {
        name: name.to_string(),
        course_code: code.to_string(),
        teacher: "张伟".to_string(),
        classroom: "教一楼101".to_string(),
        capacity,
        selected_count: 0,
        time_slot: time_slot.to_string(),
        description: Some("必修 - 数学学院 - 4学分".to_string()),
        start_week: 1,
        end_week: 16,
    }
}

async fn create_student(storage: &Arc<dyn Storage>, username: &str) -> i64 {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "not-a-real-hash".to_string(),
            role: UserRole::Student,
            display_name: None,
            avatar_url: None,
        })
        .await
        .expect("create user failed")
        .id
}

// 模拟管理端审批：直接把选课记录置为 approved
async fn approve_enrollment(db_url: &str, enrollment_id: i64) {
    let db = Database::connect(db_url).await.expect("connect failed");
    let model = Enrollments::find_by_id(enrollment_id)
        .one(&db)
        .await
        .expect("query failed")
        .expect("enrollment not found");
    let mut active: EnrollmentActiveModel = model.into();
    active.status = Set(EnrollmentStatus::Approved.to_string());
    active.update(&db).await.expect("update failed");
}

#[tokio::test]
async fn select_then_drop_restores_state() {
    let ctx = setup("select_then_drop").await;
    let student = create_student(&ctx.storage, "stu_select_drop").await;

    let course = ctx
        .storage
        .import_course(course_draft("10001", "高等数学", 50, "周一 1-2节"))
        .await
        .unwrap()
        .expect("course should be created");
    assert_eq!(course.selected_count, 0);

    let enrollment = ctx.storage.select_course(student, course.id).await.unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Pending);
    assert_eq!(enrollment.student_id, student);
    assert_eq!(enrollment.course_id, course.id);

    let after_select = ctx.storage.get_course_by_id(course.id).await.unwrap().unwrap();
    assert_eq!(after_select.selected_count, 1);

    assert!(ctx.storage.drop_course(student, course.id).await.unwrap());

    // 退课后计数回到选课前，且不留选课记录
    let after_drop = ctx.storage.get_course_by_id(course.id).await.unwrap().unwrap();
    assert_eq!(after_drop.selected_count, 0);
    assert!(ctx
        .storage
        .list_student_enrollments(student)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn select_rejects_when_capacity_reached() {
    let ctx = setup("capacity").await;
    let first = create_student(&ctx.storage, "stu_cap_first").await;
    let second = create_student(&ctx.storage, "stu_cap_second").await;

    // 容量 2，已选 1：最后一个名额可选
    let mut draft = course_draft("10002", "线性代数", 2, "周三 3-4节");
    draft.selected_count = 1;
    let course = ctx.storage.import_course(draft).await.unwrap().unwrap();

    ctx.storage.select_course(first, course.id).await.unwrap();
    let full = ctx.storage.get_course_by_id(course.id).await.unwrap().unwrap();
    assert_eq!(full.selected_count, full.capacity);

    let err = ctx.storage.select_course(second, course.id).await.unwrap_err();
    assert!(matches!(err, XKSystemError::CourseFull(_)));

    // 拒绝后计数不变，也没有残留记录
    let unchanged = ctx.storage.get_course_by_id(course.id).await.unwrap().unwrap();
    assert_eq!(unchanged.selected_count, 2);
    assert!(ctx
        .storage
        .list_student_enrollments(second)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn duplicate_select_rejected() {
    let ctx = setup("duplicate").await;
    let student = create_student(&ctx.storage, "stu_duplicate").await;

    let course = ctx
        .storage
        .import_course(course_draft("10003", "大学物理", 30, "周二 5-6节"))
        .await
        .unwrap()
        .unwrap();

    ctx.storage.select_course(student, course.id).await.unwrap();
    let err = ctx.storage.select_course(student, course.id).await.unwrap_err();
    assert!(matches!(err, XKSystemError::EnrollmentExists(_)));

    let after = ctx.storage.get_course_by_id(course.id).await.unwrap().unwrap();
    assert_eq!(after.selected_count, 1);
}

#[tokio::test]
async fn non_overlapping_courses_both_selectable() {
    let ctx = setup("no_overlap").await;
    let student = create_student(&ctx.storage, "stu_no_overlap").await;

    // 周一 1-2节 (08:00-09:40) 与 周一 3-4节 (10:00-11:40) 不冲突
    let course_a = ctx
        .storage
        .import_course(course_draft("10004", "高等数学", 50, "周一 1-2节"))
        .await
        .unwrap()
        .unwrap();
    let course_b = ctx
        .storage
        .import_course(course_draft("10005", "离散数学", 50, "周一 3-4节"))
        .await
        .unwrap()
        .unwrap();

    let enrollment_a = ctx.storage.select_course(student, course_a.id).await.unwrap();
    approve_enrollment(&ctx.db_url, enrollment_a.id).await;

    // A 已通过的情况下选 B 仍然成功
    ctx.storage.select_course(student, course_b.id).await.unwrap();

    let items = ctx.storage.list_student_enrollments(student).await.unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn overlapping_course_rejected_with_conflict_detail() {
    let ctx = setup("overlap").await;
    let student = create_student(&ctx.storage, "stu_overlap").await;

    let course_a = ctx
        .storage
        .import_course(course_draft("10006", "操作系统", 50, "周四 5-6节"))
        .await
        .unwrap()
        .unwrap();
    let course_b = ctx
        .storage
        .import_course(course_draft("10007", "计算机网络", 50, "周四 5-6节"))
        .await
        .unwrap()
        .unwrap();

    let enrollment_a = ctx.storage.select_course(student, course_a.id).await.unwrap();
    approve_enrollment(&ctx.db_url, enrollment_a.id).await;

    let err = ctx.storage.select_course(student, course_b.id).await.unwrap_err();
    match err {
        XKSystemError::TimeConflict(msg) => {
            // 冲突消息携带冲突课程名与时间描述
            assert!(msg.contains("操作系统"), "message: {msg}");
            assert!(msg.contains("周4 14:00-15:40"), "message: {msg}");
        }
        other => panic!("期望 TimeConflict，实际 {other:?}"),
    }

    // 拒绝后计数与记录都不变
    let unchanged = ctx.storage.get_course_by_id(course_b.id).await.unwrap().unwrap();
    assert_eq!(unchanged.selected_count, 0);
    assert_eq!(
        ctx.storage.list_student_enrollments(student).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn pending_enrollment_does_not_block_selection() {
    let ctx = setup("pending_no_block").await;
    let student = create_student(&ctx.storage, "stu_pending").await;

    // 两门同时段课程，但第一门停留在 pending：冲突检测只看已通过的课程
    let course_a = ctx
        .storage
        .import_course(course_draft("10008", "数据结构", 50, "周五 7-8节"))
        .await
        .unwrap()
        .unwrap();
    let course_b = ctx
        .storage
        .import_course(course_draft("10009", "算法设计", 50, "周五 7-8节"))
        .await
        .unwrap()
        .unwrap();

    ctx.storage.select_course(student, course_a.id).await.unwrap();
    ctx.storage.select_course(student, course_b.id).await.unwrap();
}

#[tokio::test]
async fn unparseable_time_slot_does_not_conflict() {
    let ctx = setup("lenient").await;
    let student = create_student(&ctx.storage, "stu_lenient").await;

    // 时间待定的课程解析不出时间段，宽松策略下不拦截选课
    let course_a = ctx
        .storage
        .import_course(course_draft("10010", "学术写作", 50, "待定"))
        .await
        .unwrap()
        .unwrap();
    let course_b = ctx
        .storage
        .import_course(course_draft("10011", "文献检索", 50, "周一 1-2节"))
        .await
        .unwrap()
        .unwrap();

    let enrollment_a = ctx.storage.select_course(student, course_a.id).await.unwrap();
    approve_enrollment(&ctx.db_url, enrollment_a.id).await;

    ctx.storage.select_course(student, course_b.id).await.unwrap();
}

#[tokio::test]
async fn drop_without_enrollment_returns_false() {
    let ctx = setup("drop_missing").await;
    let student = create_student(&ctx.storage, "stu_drop_none").await;

    let course = ctx
        .storage
        .import_course(course_draft("10012", "概率论", 40, "周二 3-4节"))
        .await
        .unwrap()
        .unwrap();

    assert!(!ctx.storage.drop_course(student, course.id).await.unwrap());

    let unchanged = ctx.storage.get_course_by_id(course.id).await.unwrap().unwrap();
    assert_eq!(unchanged.selected_count, 0);
}

#[tokio::test]
async fn drop_floors_selected_count_at_zero() {
    let ctx = setup("drop_floor").await;
    let student = create_student(&ctx.storage, "stu_drop_floor").await;

    // 导入时已选人数为 0，选课 +1 退课 -1，不会变成负数
    let course = ctx
        .storage
        .import_course(course_draft("10013", "形势与政策", 200, "周三 9-10节"))
        .await
        .unwrap()
        .unwrap();

    ctx.storage.select_course(student, course.id).await.unwrap();
    assert!(ctx.storage.drop_course(student, course.id).await.unwrap());
    assert!(!ctx.storage.drop_course(student, course.id).await.unwrap());

    let after = ctx.storage.get_course_by_id(course.id).await.unwrap().unwrap();
    assert_eq!(after.selected_count, 0);
}

#[tokio::test]
async fn import_same_course_code_is_noop() {
    let ctx = setup("import_idempotent").await;

    let first = ctx
        .storage
        .import_course(course_draft("10014", "编译原理", 60, "周五 5-6节"))
        .await
        .unwrap();
    assert!(first.is_some());

    // 同课程号再次导入不覆盖、不新建
    let second = ctx
        .storage
        .import_course(course_draft("10014", "编译原理（重复）", 99, "周五 7-8节"))
        .await
        .unwrap();
    assert!(second.is_none());

    let course = ctx
        .storage
        .get_course_by_id(first.unwrap().id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(course.name, "编译原理");
    assert_eq!(course.capacity, 60);
}
