//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_xksystem_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum XKSystemError {
            $($variant(String),)*
        }

        impl XKSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(XKSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(XKSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(XKSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl XKSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        XKSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_xksystem_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    FileOperation("E004", "File Operation Error"),
    Validation("E005", "Validation Error"),
    NotFound("E006", "Resource Not Found"),
    Serialization("E007", "Serialization Error"),
    DateParse("E008", "Date Parse Error"),
    Authentication("E009", "Authentication Error"),
    Authorization("E010", "Authorization Error"),
    CourseFull("E011", "Course Capacity Exceeded"),
    EnrollmentExists("E012", "Enrollment Already Exists"),
    EnrollmentNotFound("E013", "Enrollment Not Found"),
    TimeConflict("E014", "Course Time Conflict"),
}

impl XKSystemError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for XKSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for XKSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for XKSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        XKSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for XKSystemError {
    fn from(err: std::io::Error) -> Self {
        XKSystemError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for XKSystemError {
    fn from(err: serde_json::Error) -> Self {
        XKSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for XKSystemError {
    fn from(err: chrono::ParseError) -> Self {
        XKSystemError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, XKSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(XKSystemError::database_config("test").code(), "E001");
        assert_eq!(XKSystemError::validation("test").code(), "E005");
        assert_eq!(XKSystemError::course_full("test").code(), "E011");
        assert_eq!(XKSystemError::time_conflict("test").code(), "E014");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            XKSystemError::course_full("test").error_type(),
            "Course Capacity Exceeded"
        );
        assert_eq!(
            XKSystemError::enrollment_exists("test").error_type(),
            "Enrollment Already Exists"
        );
    }

    #[test]
    fn test_error_message() {
        let err = XKSystemError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = XKSystemError::time_conflict("周一 08:00-09:40");
        let formatted = err.format_simple();
        assert!(formatted.contains("Course Time Conflict"));
        assert!(formatted.contains("周一 08:00-09:40"));
    }
}
