use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    // 课程ID
    pub id: i64,
    // 课程名称
    pub name: String,
    // 课程代码（全局唯一）
    pub course_code: String,
    // 授课教师
    pub teacher: String,
    // 教室
    pub classroom: String,
    // 课程容量
    pub capacity: i32,
    // 已选人数
    pub selected_count: i32,
    // 上课时间，如 "周一 1-2节, 周三 3-4节"
    pub time_slot: String,
    // 课程描述
    pub description: Option<String>,
    // 起始周
    pub start_week: i32,
    // 结束周
    pub end_week: i32,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 更新时间
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
