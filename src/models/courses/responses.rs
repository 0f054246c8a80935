use serde::{Deserialize, Serialize};

use super::entities::Course;
use crate::models::PaginationInfo;

// 课程列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseListResponse {
    pub items: Vec<Course>,
    pub pagination: PaginationInfo,
}

// 课表导入响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportCoursesResponse {
    // 新建课程数量（已存在的课程号不计入）
    pub created: usize,
    pub courses: Vec<Course>,
}
