use serde::{Deserialize, Serialize};

use super::entities::User;

// 单个用户响应
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}
