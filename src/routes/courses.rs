use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::requests::{CourseListQuery, ImportQueryParams};
use crate::models::users::entities::UserRole;
use crate::services::CourseService;

// 懒加载的全局 COURSE_SERVICE 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

// HTTP处理程序
pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListQuery>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(&req, query.into_inner()).await
}

pub async fn get_course(req: HttpRequest, course_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(&req, course_id.into_inner()).await
}

pub async fn import_courses(
    req: HttpRequest,
    payload: Multipart,
    query: web::Query<ImportQueryParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .import_courses(&req, payload, query.into_inner())
        .await
}

pub async fn select_course(
    req: HttpRequest,
    course_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .select_course(&req, course_id.into_inner())
        .await
}

pub async fn drop_course(req: HttpRequest, course_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.drop_course(&req, course_id.into_inner()).await
}

// 配置路由
pub fn configure_courses_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireJWT)
            .service(
                // 登录用户查询课程列表
                web::resource("").route(web::get().to(list_courses)),
            )
            .service(
                web::resource("/import").route(
                    web::post()
                        .to(import_courses)
                        // 仅管理员可导入课表
                        .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                ),
            )
            .service(web::resource("/{course_id}").route(web::get().to(get_course)))
            .service(web::resource("/{course_id}/select").route(web::post().to(select_course)))
            .service(web::resource("/{course_id}/drop").route(web::post().to(drop_course))),
    );
}
