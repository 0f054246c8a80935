//! 选课服务
//!
//! 容量、重复选课、时间冲突的校验与落库都在存储层事务内完成，
//! 这里负责把拒绝原因映射为对应的响应码。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::CourseService;
use crate::errors::XKSystemError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};

pub async fn select_course(
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

    match storage.select_course(student_id, course_id).await {
        Ok(enrollment) => {
            info!("Student {} selected course {}", student_id, course_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(enrollment, "选课成功")))
        }
        Err(XKSystemError::NotFound(msg)) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::CourseNotFound, msg))),
        Err(XKSystemError::CourseFull(msg)) => Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseFull, msg))),
        Err(XKSystemError::EnrollmentExists(msg)) => Ok(HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::EnrollmentAlreadyExists, msg),
        )),
        Err(XKSystemError::TimeConflict(msg)) => Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseTimeConflict, msg))),
        Err(e) => {
            error!(
                "Error selecting course {} for student {}: {}",
                course_id, student_id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::EnrollmentFailed,
                    "选课失败",
                )),
            )
        }
    }
}
