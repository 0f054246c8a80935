//! 选课存储操作
//!
//! 选课/退课把约束校验和计数变更放在同一个数据库事务里：
//! 事务对象在任意提前返回的路径上被丢弃即回滚，已选人数与
//! 选课记录要么一起落库、要么都不落库。

use std::collections::HashMap;

use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::errors::{Result, XKSystemError};
use crate::models::enrollments::{
    entities::{Enrollment, EnrollmentStatus},
    responses::EnrollmentItem,
};
use crate::utils::schedule::check_conflicts;
use sea_orm::sea_query::{Expr, ExprTrait as _};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 学生选课
    ///
    /// 校验顺序与拒绝原因：
    /// 1. 课程不存在 -> NotFound
    /// 2. 课程已满 -> CourseFull
    /// 3. 已有该课程的选课记录（任意状态）-> EnrollmentExists
    /// 4. 与已通过课程时间冲突 -> TimeConflict（携带冲突课程名与时间描述）
    ///
    /// 通过校验后在同一事务内完成：条件递增已选人数（仍小于容量才生效，
    /// 并发抢最后一个名额时落败方按课程已满拒绝）+ 插入 pending 记录
    /// （(student_id, course_id) 唯一索引兜底并发重复选课）。
    pub async fn select_course_impl(&self, student_id: i64, course_id: i64) -> Result<Enrollment> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| XKSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let course = Courses::find_by_id(course_id)
            .one(&txn)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询课程失败: {e}")))?
            .ok_or_else(|| XKSystemError::not_found("课程不存在"))?;

        // 检查课程容量
        if course.selected_count >= course.capacity {
            return Err(XKSystemError::course_full("课程已满"));
        }

        // 检查是否已经选过这门课
        let existing = Enrollments::find()
            .filter(
                Condition::all()
                    .add(Column::StudentId.eq(student_id))
                    .add(Column::CourseId.eq(course_id)),
            )
            .one(&txn)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询选课记录失败: {e}")))?;

        if existing.is_some() {
            return Err(XKSystemError::enrollment_exists("已经选过这门课程"));
        }

        // 检查与已通过课程的时间冲突
        let approved = Enrollments::find()
            .filter(
                Condition::all()
                    .add(Column::StudentId.eq(student_id))
                    .add(Column::Status.eq(EnrollmentStatus::APPROVED)),
            )
            .all(&txn)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询选课记录失败: {e}")))?;

        if !approved.is_empty() {
            let course_ids: Vec<i64> = approved.iter().map(|e| e.course_id).collect();
            let selected_courses = Courses::find()
                .filter(CourseColumn::Id.is_in(course_ids))
                .all(&txn)
                .await
                .map_err(|e| XKSystemError::database_operation(format!("查询课程失败: {e}")))?;

            for selected in &selected_courses {
                let (has_conflict, conflict_msg) =
                    check_conflicts(&course.time_slot, &selected.time_slot);
                if has_conflict {
                    return Err(XKSystemError::time_conflict(format!(
                        "与已选课程 {} {}",
                        selected.name, conflict_msg
                    )));
                }
            }
        }

        // 条件递增已选人数，并发场景下只有容量内的请求生效
        let update = Courses::update_many()
            .col_expr(
                CourseColumn::SelectedCount,
                Expr::col(CourseColumn::SelectedCount).add(1),
            )
            .col_expr(
                CourseColumn::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(CourseColumn::Id.eq(course_id))
            .filter(CourseColumn::SelectedCount.lt(course.capacity))
            .exec(&txn)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("更新已选人数失败: {e}")))?;

        if update.rows_affected == 0 {
            return Err(XKSystemError::course_full("课程已满"));
        }

        // 创建选课记录
        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            status: Set(EnrollmentStatus::Pending.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let enrollment = match model.insert(&txn).await {
            Ok(result) => result,
            Err(e) if is_unique_violation(&e) => {
                return Err(XKSystemError::enrollment_exists("已经选过这门课程"));
            }
            Err(e) => {
                return Err(XKSystemError::database_operation(format!(
                    "创建选课记录失败: {e}"
                )));
            }
        };

        txn.commit()
            .await
            .map_err(|e| XKSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(enrollment.into_enrollment())
    }

    /// 学生退课
    ///
    /// 未选过该课程时返回 false。删除记录与已选人数回退（最低为 0）
    /// 在同一事务中完成。
    pub async fn drop_course_impl(&self, student_id: i64, course_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| XKSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let deleted = Enrollments::delete_many()
            .filter(
                Condition::all()
                    .add(Column::StudentId.eq(student_id))
                    .add(Column::CourseId.eq(course_id)),
            )
            .exec(&txn)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("删除选课记录失败: {e}")))?;

        if deleted.rows_affected == 0 {
            return Ok(false);
        }

        // 回退已选人数，计数为 0 时不再减少
        Courses::update_many()
            .col_expr(
                CourseColumn::SelectedCount,
                Expr::col(CourseColumn::SelectedCount).sub(1),
            )
            .col_expr(
                CourseColumn::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(CourseColumn::Id.eq(course_id))
            .filter(CourseColumn::SelectedCount.gt(0))
            .exec(&txn)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("更新已选人数失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| XKSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(true)
    }

    /// 列出学生的全部选课记录，附课程摘要信息
    pub async fn list_student_enrollments_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<EnrollmentItem>> {
        let enrollments = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询选课记录失败: {e}")))?;

        if enrollments.is_empty() {
            return Ok(vec![]);
        }

        let course_ids: Vec<i64> = enrollments.iter().map(|e| e.course_id).collect();
        let courses: HashMap<i64, _> = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .all(&self.db)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let items = enrollments
            .into_iter()
            .filter_map(|model| {
                let course = courses.get(&model.course_id)?;
                let enrollment = model.into_enrollment();
                Some(EnrollmentItem {
                    id: enrollment.id,
                    course_id: enrollment.course_id,
                    course_name: course.name.clone(),
                    teacher: course.teacher.clone(),
                    time_slot: course.time_slot.clone(),
                    classroom: course.classroom.clone(),
                    status: enrollment.status,
                    created_at: enrollment.created_at,
                    updated_at: enrollment.updated_at,
                })
            })
            .collect();

        Ok(items)
    }
}
