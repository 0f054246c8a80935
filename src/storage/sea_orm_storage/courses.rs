//! 课程存储操作

use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::errors::{Result, XKSystemError};
use crate::models::{
    PaginationInfo,
    courses::{
        entities::Course,
        requests::{CourseListQuery, CreateCourseRequest},
        responses::CourseListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 按课程号幂等导入课程
    ///
    /// 课程号已存在时不覆盖，返回 None。并发导入同一课程号依赖
    /// course_code 唯一约束兜底，冲突同样按已存在处理。
    pub async fn import_course_impl(&self, draft: CreateCourseRequest) -> Result<Option<Course>> {
        let existing = Courses::find()
            .filter(Column::CourseCode.eq(&draft.course_code))
            .one(&self.db)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询课程失败: {e}")))?;

        if existing.is_some() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            name: Set(draft.name),
            course_code: Set(draft.course_code),
            teacher: Set(draft.teacher),
            classroom: Set(draft.classroom),
            capacity: Set(draft.capacity),
            selected_count: Set(draft.selected_count),
            time_slot: Set(draft.time_slot),
            description: Set(draft.description),
            start_week: Set(draft.start_week),
            end_week: Set(draft.end_week),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(result) => Ok(Some(result.into_course())),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(XKSystemError::database_operation(format!(
                "导入课程失败: {e}"
            ))),
        }
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Courses::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::CourseCode.contains(&escaped))
                    .add(Column::Teacher.contains(&escaped)),
            );
        }

        // 排序
        select = select.order_by_asc(Column::CourseCode);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询课程总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询课程页数失败: {e}")))?;

        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(CourseListResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| XKSystemError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }
}
