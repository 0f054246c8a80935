//! 业务错误码
//!
//! 与 HTTP 状态码分离，前端按 code 字段判断具体业务错误。

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxxx
    BadRequest = 10001,
    Unauthorized = 10002,
    Forbidden = 10003,
    NotFound = 10004,
    InternalServerError = 10005,

    // 认证/用户 2xxxx
    AuthFailed = 20001,
    RegisterFailed = 20002,
    UserNotFound = 20003,
    UserNameInvalid = 20004,
    UserEmailInvalid = 20005,
    UserNameAlreadyExists = 20006,
    UserEmailAlreadyExists = 20007,
    UserPasswordInvalid = 20008,
    UserUpdateFailed = 20009,

    // 课程 3xxxx
    CourseNotFound = 30001,
    CourseListFailed = 30002,

    // 选课 4xxxx
    CourseFull = 40001,
    EnrollmentAlreadyExists = 40002,
    EnrollmentNotFound = 40003,
    CourseTimeConflict = 40004,
    EnrollmentFailed = 40005,

    // 课表导入 5xxxx
    FileUploadFailed = 50001,
    UnsupportedFileType = 50002,
    ImportFileMissingColumn = 50003,
    ImportFileParseFailed = 50004,
    ImportFileDataInvalid = 50005,
    ImportFailed = 50006,
}
