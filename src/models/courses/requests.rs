use serde::{Deserialize, Serialize};

// 课程列表查询参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    // 按课程名称/课程号/教师搜索
    pub search: Option<String>,
}

// 创建课程请求，也是课表导入解析出的课程草稿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    pub course_code: String,
    pub teacher: String,
    pub classroom: String,
    pub capacity: i32,
    pub selected_count: i32,
    pub time_slot: String,
    pub description: Option<String>,
    pub start_week: i32,
    pub end_week: i32,
}

// 课表导入查询参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportQueryParams {
    // 文件类型标签: table / document，缺省时按扩展名推断
    #[serde(rename = "type")]
    pub file_type: Option<String>,
}
