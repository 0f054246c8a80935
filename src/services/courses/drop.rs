//! 退课服务

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::CourseService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};

pub async fn drop_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let student_id = match RequireJWT::extract_user_id(request) {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Unauthorized: missing user id",
            )));
        }
    };

    let storage = service.get_storage(request);

    match storage.drop_course(student_id, course_id).await {
        Ok(true) => {
            info!("Student {} dropped course {}", student_id, course_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("退课成功")))
        }
        Ok(false) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::EnrollmentNotFound,
            "未选择该课程",
        ))),
        Err(e) => {
            error!(
                "Error dropping course {} for student {}: {}",
                course_id, student_id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::EnrollmentFailed,
                    "退课失败",
                )),
            )
        }
    }
}
