use serde::{Deserialize, Serialize};

// 选课状态
//
// pending -> approved / rejected 的流转由管理端直接修改记录完成，
// 核心只负责 absent -> pending（选课）和任意状态 -> absent（退课）。
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,  // 待处理
    Approved, // 已通过
    Rejected, // 已拒绝
}

impl EnrollmentStatus {
    pub const PENDING: &'static str = "pending";
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";
}

impl<'de> Deserialize<'de> for EnrollmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            EnrollmentStatus::PENDING => Ok(EnrollmentStatus::Pending),
            EnrollmentStatus::APPROVED => Ok(EnrollmentStatus::Approved),
            EnrollmentStatus::REJECTED => Ok(EnrollmentStatus::Rejected),
            _ => Err(serde::de::Error::custom(format!(
                "无效的选课状态: '{s}'. 支持的状态: pending, approved, rejected"
            ))),
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentStatus::Pending => write!(f, "{}", EnrollmentStatus::PENDING),
            EnrollmentStatus::Approved => write!(f, "{}", EnrollmentStatus::APPROVED),
            EnrollmentStatus::Rejected => write!(f, "{}", EnrollmentStatus::REJECTED),
        }
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EnrollmentStatus::Pending),
            "approved" => Ok(EnrollmentStatus::Approved),
            "rejected" => Ok(EnrollmentStatus::Rejected),
            _ => Err(format!("Invalid enrollment status: {s}")),
        }
    }
}

// 选课记录实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub status: EnrollmentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
