use serde::{Deserialize, Serialize};

use super::entities::EnrollmentStatus;

// 选课记录列表项，附带课程摘要信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentItem {
    pub id: i64,
    pub course_id: i64,
    pub course_name: String,
    pub teacher: String,
    pub time_slot: String,
    pub classroom: String,
    pub status: EnrollmentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 学生选课记录列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct EnrollmentListResponse {
    pub items: Vec<EnrollmentItem>,
}
