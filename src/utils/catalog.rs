//! 课表文件解析
//!
//! 将上传的课表文件解析为课程草稿列表。支持两类文件：
//! - 表格（CSV / XLSX）：固定的十一列中文表头
//! - 文档（分页提取文本）：按固定的十一字段正则逐页匹配课程行
//!
//! 两类解析器共享同一套字段归一化规则（教室取分号列表首项、
//! 时间字符串标准化、起止周解析失败回退 1-16 周）。

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Reader, Xlsx};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::courses::requests::CreateCourseRequest;
use crate::models::ErrorCode;

// 表格文件必需的列
const REQUIRED_COLUMNS: [&str; 11] = [
    "课程名称",
    "课程号",
    "任课教师",
    "教学地点",
    "课堂容量",
    "已选人数",
    "上课时间",
    "课程性质",
    "学分",
    "开课学院",
    "起始结束周",
];

// 教室/时间缺省占位
const TBD: &str = "待定";

// 文档文本中的课程行：
// 开课学院,课程名称,课程性质,(教学班名称),课程号,学分,任课教师,课堂容量,已选人数,上课时间,教学地点
// 字段以行为边界，否则行尾的教学地点会贪婪吞掉下一行的开课学院
static COURSE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([^,\n]+),([^,\n]+),([^,\n]+),\([^)\n]+\),(\d+),(\d+\.?\d*),([^,\n]+),(\d+),(\d+),([^,\n]+),([^,\n]+)",
    )
    .expect("Invalid course line regex")
});

// 时间字段内嵌的起止周标注，如 {1-16周}
static WEEK_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\d+)-(\d+)周\}").expect("Invalid week range regex"));

/// 课表文件类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFileType {
    /// 结构化表格（CSV / XLSX）
    Table,
    /// 分页文档提取文本
    Document,
}

impl CatalogFileType {
    /// 根据文件扩展名推断类型
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = file_name.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "csv" | "xlsx" => Some(Self::Table),
            "txt" => Some(Self::Document),
            _ => None,
        }
    }
}

impl std::str::FromStr for CatalogFileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "document" => Ok(Self::Document),
            _ => Err(format!("Invalid catalog file type: {s}")),
        }
    }
}

/// 解析错误
#[derive(Debug)]
pub enum CatalogParseError {
    // 表头缺少必需列，携带全部缺失列名
    MissingColumns(Vec<String>),
    ParseFailed(String),
    EmptyFile,
}

impl CatalogParseError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingColumns(_) => ErrorCode::ImportFileMissingColumn,
            Self::ParseFailed(_) => ErrorCode::ImportFileParseFailed,
            Self::EmptyFile => ErrorCode::ImportFileDataInvalid,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::MissingColumns(cols) => format!("课表文件缺少必要的列：{}", cols.join(", ")),
            Self::ParseFailed(msg) => msg.clone(),
            Self::EmptyFile => "文件中没有数据".to_string(),
        }
    }
}

/// 课表解析器
pub trait CatalogParser: Send + Sync {
    fn parse(
        &self,
        data: &[u8],
        file_name: &str,
    ) -> Result<Vec<CreateCourseRequest>, CatalogParseError>;
}

/// 获取对应的解析器
pub fn get_parser(file_type: CatalogFileType) -> &'static dyn CatalogParser {
    match file_type {
        CatalogFileType::Table => &TableCatalogParser,
        CatalogFileType::Document => &DocumentCatalogParser,
    }
}

// 教学地点可能有多个地点用分号分隔，取第一个教室
fn first_classroom(raw: &str) -> String {
    match raw.split(';').next() {
        Some(first) => first.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

// 时间格式标准化，例如 "星期四第4-5节{1-16周}" -> "周四第4-5节"
fn normalize_time_slot(raw: &str) -> String {
    let replaced = raw.replace("星期", "周");
    match replaced.split('{').next() {
        Some(head) => head.trim().to_string(),
        None => replaced.trim().to_string(),
    }
}

// 解析 "1-16周" / "1-16" 形式的起始结束周，失败回退 (1, 16)
fn parse_week_range(raw: &str) -> (i32, i32) {
    let cleaned = raw.replace('周', "");
    let mut parts = cleaned.split('-');
    match (
        parts.next().map(str::trim).and_then(|s| s.parse::<i32>().ok()),
        parts.next().map(str::trim).and_then(|s| s.parse::<i32>().ok()),
    ) {
        (Some(start), Some(end)) => (start, end),
        _ => (1, 16),
    }
}

// 从时间字段的 {1-16周} 标注中提取起止周，没有标注时回退 (1, 16)
fn extract_braced_week_range(raw: &str) -> (i32, i32) {
    match WEEK_RANGE_RE.captures(raw) {
        Some(caps) => {
            let start = caps[1].parse::<i32>().unwrap_or(1);
            let end = caps[2].parse::<i32>().unwrap_or(16);
            (start, end)
        }
        None => (1, 16),
    }
}

/// 表格课表解析器（CSV / XLSX）
pub struct TableCatalogParser;

impl CatalogParser for TableCatalogParser {
    fn parse(
        &self,
        data: &[u8],
        file_name: &str,
    ) -> Result<Vec<CreateCourseRequest>, CatalogParseError> {
        if data.is_empty() {
            return Err(CatalogParseError::EmptyFile);
        }
        if file_name.to_lowercase().ends_with(".xlsx") {
            parse_xlsx(data)
        } else {
            parse_csv(data)
        }
    }
}

// 校验表头并返回列名到下标的映射
fn build_header_map(
    headers: impl Iterator<Item = String>,
) -> Result<HashMap<String, usize>, CatalogParseError> {
    let header_map: HashMap<String, usize> = headers
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !header_map.contains_key(**col))
        .map(|col| col.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(CatalogParseError::MissingColumns(missing));
    }

    Ok(header_map)
}

// 由一行表格字段组装课程草稿，课程号为空的行返回 None
fn row_to_draft(get: impl Fn(&str) -> String) -> Option<CreateCourseRequest> {
    let course_code = get("课程号");
    if course_code.is_empty() {
        return None;
    }

    let classroom_raw = get("教学地点");
    let classroom = if classroom_raw.is_empty() {
        TBD.to_string()
    } else {
        first_classroom(&classroom_raw)
    };

    let time_slot_raw = get("上课时间");
    let time_slot = if time_slot_raw.is_empty() {
        TBD.to_string()
    } else {
        normalize_time_slot(&time_slot_raw)
    };

    let weeks_raw = get("起始结束周");
    let (start_week, end_week) = if weeks_raw.is_empty() {
        (1, 16)
    } else {
        parse_week_range(&weeks_raw)
    };

    Some(CreateCourseRequest {
        name: get("课程名称"),
        course_code,
        teacher: get("任课教师"),
        classroom,
        capacity: get("课堂容量").parse().unwrap_or(0),
        selected_count: get("已选人数").parse().unwrap_or(0),
        time_slot,
        description: Some(format!(
            "{} - {} - {}学分",
            get("课程性质"),
            get("开课学院"),
            get("学分")
        )),
        start_week,
        end_week,
    })
}

fn parse_csv(data: &[u8]) -> Result<Vec<CreateCourseRequest>, CatalogParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(data));

    let headers = rdr
        .headers()
        .map_err(|e| CatalogParseError::ParseFailed(format!("读取表头失败: {e}")))?
        .clone();
    let header_map = build_header_map(headers.iter().map(|h| h.to_string()))?;

    let mut courses = Vec::new();

    for (row_num, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            CatalogParseError::ParseFailed(format!("第 {} 行解析失败: {e}", row_num + 2))
        })?;

        let get = |col: &str| -> String {
            header_map
                .get(col)
                .and_then(|i| record.get(*i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        if let Some(draft) = row_to_draft(get) {
            courses.push(draft);
        }
    }

    Ok(courses)
}

fn parse_xlsx(data: &[u8]) -> Result<Vec<CreateCourseRequest>, CatalogParseError> {
    let cursor = Cursor::new(data.to_vec());
    let mut workbook: Xlsx<_> = Xlsx::new(cursor)
        .map_err(|e| CatalogParseError::ParseFailed(format!("打开 XLSX 失败: {e}")))?;

    // 取第一个工作表
    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| CatalogParseError::ParseFailed("工作簿中没有工作表".to_string()))?;

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| CatalogParseError::ParseFailed(format!("读取工作表失败: {e}")))?;

    let mut rows_iter = range.rows();

    let header_row = rows_iter.next().ok_or(CatalogParseError::EmptyFile)?;
    let header_map = build_header_map(header_row.iter().map(|cell| cell.to_string()))?;

    let mut courses = Vec::new();

    for row in rows_iter {
        let get = |col: &str| -> String {
            header_map
                .get(col)
                .and_then(|i| row.get(*i))
                .map(|c| c.to_string().trim().to_string())
                .unwrap_or_default()
        };

        if let Some(draft) = row_to_draft(get) {
            courses.push(draft);
        }
    }

    Ok(courses)
}

/// 文档课表解析器
///
/// 输入为上游文本提取产出的 UTF-8 页文本，页之间以换页符分隔。
/// 每页用固定字段正则匹配课程行，一页内的全部匹配都会提取。
pub struct DocumentCatalogParser;

impl CatalogParser for DocumentCatalogParser {
    fn parse(
        &self,
        data: &[u8],
        _file_name: &str,
    ) -> Result<Vec<CreateCourseRequest>, CatalogParseError> {
        if data.is_empty() {
            return Err(CatalogParseError::EmptyFile);
        }

        let text = String::from_utf8_lossy(data);
        let mut courses = Vec::new();

        for page in text.split('\u{000C}') {
            for caps in COURSE_LINE_RE.captures_iter(page) {
                let classroom = first_classroom(caps[10].trim());

                let time_slot_raw = caps[9].trim();
                let time_slot = if time_slot_raw.contains('{') {
                    normalize_time_slot(time_slot_raw)
                } else {
                    time_slot_raw.to_string()
                };
                let (start_week, end_week) = extract_braced_week_range(time_slot_raw);

                courses.push(CreateCourseRequest {
                    name: caps[2].trim().to_string(),
                    course_code: caps[4].trim().to_string(),
                    teacher: caps[6].trim().to_string(),
                    classroom,
                    capacity: caps[7].parse().unwrap_or(0),
                    selected_count: caps[8].parse().unwrap_or(0),
                    time_slot,
                    description: Some(format!(
                        "{} - {} - {}学分",
                        caps[3].trim(),
                        caps[1].trim(),
                        &caps[5]
                    )),
                    start_week,
                    end_week,
                });
            }
        }

        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_HEADER: &str =
        "课程名称,课程号,任课教师,教学地点,课堂容量,已选人数,上课时间,课程性质,学分,开课学院,起始结束周";

    #[test]
    fn test_csv_basic_row() {
        let data = format!(
            "{CSV_HEADER}\n高等数学,10001,张伟,教一楼101,120,30,星期一第1-2节{{1-16周}},必修,4,数学学院,1-16周"
        );
        let courses = TableCatalogParser.parse(data.as_bytes(), "courses.csv").unwrap();
        assert_eq!(courses.len(), 1);

        let course = &courses[0];
        assert_eq!(course.name, "高等数学");
        assert_eq!(course.course_code, "10001");
        assert_eq!(course.teacher, "张伟");
        assert_eq!(course.classroom, "教一楼101");
        assert_eq!(course.capacity, 120);
        assert_eq!(course.selected_count, 30);
        assert_eq!(course.time_slot, "周一第1-2节");
        assert_eq!(course.description.as_deref(), Some("必修 - 数学学院 - 4学分"));
        assert_eq!((course.start_week, course.end_week), (1, 16));
    }

    #[test]
    fn test_csv_missing_columns_all_listed() {
        let data = "课程名称,课程号,任课教师\n高等数学,10001,张伟";
        let err = TableCatalogParser.parse(data.as_bytes(), "courses.csv").unwrap_err();
        match err {
            CatalogParseError::MissingColumns(cols) => {
                assert_eq!(cols.len(), 8);
                assert!(cols.contains(&"学分".to_string()));
                assert!(cols.contains(&"起始结束周".to_string()));
            }
            other => panic!("期望 MissingColumns，实际 {other:?}"),
        }
    }

    #[test]
    fn test_csv_missing_single_column() {
        let data = "课程名称,课程号,任课教师,教学地点,课堂容量,已选人数,上课时间,课程性质,开课学院,起始结束周\n";
        let err = TableCatalogParser.parse(data.as_bytes(), "courses.csv").unwrap_err();
        match err {
            CatalogParseError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["学分".to_string()]);
            }
            other => panic!("期望 MissingColumns，实际 {other:?}"),
        }
    }

    #[test]
    fn test_csv_skips_rows_without_course_code() {
        let data = format!(
            "{CSV_HEADER}\n高等数学,,张伟,教一楼101,120,30,周一 1-2节,必修,4,数学学院,1-16周\n线性代数,10002,李娜,教二楼202,90,0,周三 3-4节,必修,3,数学学院,1-16周"
        );
        let courses = TableCatalogParser.parse(data.as_bytes(), "courses.csv").unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_code, "10002");
    }

    #[test]
    fn test_csv_missing_fields_fall_back() {
        let data = format!(
            "{CSV_HEADER}\n大学物理,10003,王芳,,abc,,,必修,4,物理学院,第八周"
        );
        let courses = TableCatalogParser.parse(data.as_bytes(), "courses.csv").unwrap();
        let course = &courses[0];
        assert_eq!(course.classroom, "待定");
        assert_eq!(course.time_slot, "待定");
        assert_eq!(course.capacity, 0);
        assert_eq!(course.selected_count, 0);
        // 起始结束周解析失败回退 1-16
        assert_eq!((course.start_week, course.end_week), (1, 16));
    }

    #[test]
    fn test_csv_classroom_keeps_first_of_list() {
        let data = format!(
            "{CSV_HEADER}\n编译原理,10004,刘强,教三楼303;教三楼305,60,12,周五 5-6节,必修,3,计算机学院,4-12周"
        );
        let courses = TableCatalogParser.parse(data.as_bytes(), "courses.csv").unwrap();
        assert_eq!(courses[0].classroom, "教三楼303");
        assert_eq!((courses[0].start_week, courses[0].end_week), (4, 12));
    }

    #[test]
    fn test_document_single_page() {
        let text = "计算机学院,操作系统,必修,(操作系统01班),20251001,3.5,陈杰,80,42,星期四第5-6节{1-16周},教四楼401;教四楼403";
        let courses = DocumentCatalogParser.parse(text.as_bytes(), "catalog.txt").unwrap();
        assert_eq!(courses.len(), 1);

        let course = &courses[0];
        assert_eq!(course.name, "操作系统");
        assert_eq!(course.course_code, "20251001");
        assert_eq!(course.teacher, "陈杰");
        assert_eq!(course.classroom, "教四楼401");
        assert_eq!(course.capacity, 80);
        assert_eq!(course.selected_count, 42);
        assert_eq!(course.time_slot, "周四第5-6节");
        assert_eq!(
            course.description.as_deref(),
            Some("必修 - 计算机学院 - 3.5学分")
        );
        assert_eq!((course.start_week, course.end_week), (1, 16));
    }

    #[test]
    fn test_document_multiple_pages_and_matches() {
        let text = concat!(
            "软件学院,软件工程,必修,(软工01班),20252001,4,赵敏,100,88,星期一第1-2节{2-14周},教五楼501\n",
            "软件学院,软件测试,选修,(软测01班),20252002,2,孙浩,60,10,星期二第3-4节{1-8周},教五楼502\n",
            "\u{000C}",
            "外国语学院,大学英语,必修,(英语12班),20253001,2,周静,40,40,星期三第7-8节{1-16周},外语楼201",
        );
        let courses = DocumentCatalogParser.parse(text.as_bytes(), "catalog.txt").unwrap();
        assert_eq!(courses.len(), 3);
        assert_eq!((courses[0].start_week, courses[0].end_week), (2, 14));
        assert_eq!((courses[1].start_week, courses[1].end_week), (1, 8));
        assert_eq!(courses[2].course_code, "20253001");
    }

    #[test]
    fn test_document_time_without_braces_kept_verbatim() {
        let text = "理学院,概率论,必修,(概率01班),20254001,3,吴磊,70,5,周二 3-4节,理科楼301";
        let courses = DocumentCatalogParser.parse(text.as_bytes(), "catalog.txt").unwrap();
        assert_eq!(courses[0].time_slot, "周二 3-4节");
        assert_eq!((courses[0].start_week, courses[0].end_week), (1, 16));
    }

    #[test]
    fn test_document_non_matching_text_skipped() {
        let text = "2025-2026学年第一学期课程表\n第 1 页 共 10 页";
        let courses = DocumentCatalogParser.parse(text.as_bytes(), "catalog.txt").unwrap();
        assert!(courses.is_empty());
    }

    #[test]
    fn test_file_type_dispatch() {
        assert_eq!(
            CatalogFileType::from_file_name("课程表.csv"),
            Some(CatalogFileType::Table)
        );
        assert_eq!(
            CatalogFileType::from_file_name("课程表.XLSX"),
            Some(CatalogFileType::Table)
        );
        assert_eq!(
            CatalogFileType::from_file_name("catalog.txt"),
            Some(CatalogFileType::Document)
        );
        assert_eq!(CatalogFileType::from_file_name("catalog.exe"), None);

        assert_eq!("table".parse::<CatalogFileType>().unwrap(), CatalogFileType::Table);
        assert_eq!(
            "document".parse::<CatalogFileType>().unwrap(),
            CatalogFileType::Document
        );
        assert!("pdf".parse::<CatalogFileType>().is_err());
    }

    #[test]
    fn test_week_range_parsing() {
        assert_eq!(parse_week_range("1-16周"), (1, 16));
        assert_eq!(parse_week_range("3-9"), (3, 9));
        assert_eq!(parse_week_range("全学期"), (1, 16));
        assert_eq!(extract_braced_week_range("星期四第5-6节{2-10周}"), (2, 10));
        assert_eq!(extract_braced_week_range("星期四第5-6节"), (1, 16));
    }
}
