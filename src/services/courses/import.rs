//! 课表导入服务
//!
//! 接收上传的课表文件，按类型标签分发给对应解析器，
//! 再按课程号幂等写入课程表。同一课程号重复导入不覆盖、不计数。

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::StreamExt;
use tracing::{error, info};

use super::CourseService;
use crate::config::AppConfig;
use crate::models::courses::requests::ImportQueryParams;
use crate::models::courses::responses::ImportCoursesResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::catalog::{CatalogFileType, get_parser};

/// 导入课表
pub async fn import_courses(
    service: &CourseService,
    request: &HttpRequest,
    mut payload: Multipart,
    query: ImportQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 读取文件内容
    let (file_bytes, file_name) = match read_file_from_multipart(&mut payload).await {
        Ok(result) => result,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileUploadFailed,
                format!("文件读取失败: {e}"),
            )));
        }
    };

    if file_bytes.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileUploadFailed,
            "文件内容为空",
        )));
    }

    if file_bytes.len() > AppConfig::get().upload.max_size {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileUploadFailed,
            "文件超出大小限制",
        )));
    }

    // 类型标签优先，缺省时按扩展名推断
    let file_type = match resolve_file_type(&query, &file_name) {
        Ok(file_type) => file_type,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UnsupportedFileType, msg)));
        }
    };

    // 解析文件
    let drafts = match get_parser(file_type).parse(&file_bytes, &file_name) {
        Ok(drafts) => drafts,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(e.error_code(), e.message())));
        }
    };

    // 按课程号幂等入库
    let mut created_courses = Vec::new();
    for draft in drafts {
        match storage.import_course(draft).await {
            Ok(Some(course)) => created_courses.push(course),
            Ok(None) => {} // 课程号已存在，跳过
            Err(e) => {
                error!("导入课程失败: {}", e);
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::ImportFailed,
                        format!("导入课程失败: {e}"),
                    )),
                );
            }
        }
    }

    let created = created_courses.len();
    info!("成功导入 {} 门课程（文件: {}）", created, file_name);

    let response = ImportCoursesResponse {
        created,
        courses: created_courses,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        format!("成功导入 {created} 门课程"),
    )))
}

fn resolve_file_type(
    query: &ImportQueryParams,
    file_name: &str,
) -> Result<CatalogFileType, String> {
    if let Some(ref tag) = query.file_type {
        return tag
            .parse::<CatalogFileType>()
            .map_err(|_| format!("不支持的文件类型标签: {tag}，支持: table, document"));
    }

    CatalogFileType::from_file_name(file_name)
        .ok_or_else(|| format!("无法从文件名推断课表类型: {file_name}"))
}

async fn read_file_from_multipart(payload: &mut Multipart) -> Result<(Vec<u8>, String), String> {
    let mut file_bytes = Vec::new();
    let mut file_name = String::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| format!("读取字段失败: {e}"))?;

        if field.name().map(|n| n == "file").unwrap_or(false) {
            // 获取文件名
            if let Some(content_disposition) = field.content_disposition() {
                file_name = content_disposition
                    .get_filename()
                    .unwrap_or("upload.csv")
                    .to_string();
            }

            // 读取内容
            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| format!("读取数据失败: {e}"))?;
                file_bytes.extend_from_slice(&data);
            }
        }
    }

    if file_bytes.is_empty() {
        return Err("未找到文件字段".to_string());
    }

    Ok((file_bytes, file_name))
}
