//! 课程时间解析与冲突检测
//!
//! 上课时间以展示字符串存储，如 "周一 1-2节, 周三 3-4节"。
//! 冲突检测时临时解析为 [`TimeSlot`] 列表，按节次映射表换算为具体时刻。

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

// 单个时间段格式：周<星期汉字><起始节>-<结束节>节，只锚定段首，允许尾部附加内容
static SLOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^周([一-龥])\s*(\d+)-(\d+)节").expect("Invalid slot regex"));

/// 一周内一次上课时间段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    /// 星期，1-7 对应周一到周日
    pub day: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// 检查两个时间段是否重叠
    ///
    /// 区间按开区间比较，首尾相接（a.end == b.start）不算冲突。
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        if self.day != other.day {
            return false;
        }
        self.start < other.end && self.end > other.start
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("Invalid clock time")
}

// 节次到具体时刻的映射，只有奇数节作为锚点
fn period_times(period: u32) -> Option<(NaiveTime, NaiveTime)> {
    match period {
        1 => Some((hm(8, 0), hm(9, 40))),
        3 => Some((hm(10, 0), hm(11, 40))),
        5 => Some((hm(14, 0), hm(15, 40))),
        7 => Some((hm(16, 0), hm(17, 40))),
        9 => Some((hm(19, 0), hm(20, 40))),
        _ => None,
    }
}

// 星期汉字到数字的映射
fn weekday_number(ch: char) -> Option<u8> {
    match ch {
        '一' => Some(1),
        '二' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '日' => Some(7),
        _ => None,
    }
}

/// 解析上课时间字符串为时间段列表
///
/// 逗号分隔多个时间段。无法识别的段（格式不符、未知星期、
/// 节次不在映射表中）直接跳过，不报错，因此结果可能为空。
pub fn parse_time_slots(time_slot: &str) -> Vec<TimeSlot> {
    let mut slots = Vec::new();

    for segment in time_slot.split(',') {
        let segment = segment.trim();
        let Some(caps) = SLOT_RE.captures(segment) else {
            continue;
        };

        let Some(day) = caps[1].chars().next().and_then(weekday_number) else {
            continue;
        };
        let Ok(start_period) = caps[2].parse::<u32>() else {
            continue;
        };
        let Ok(end_period) = caps[3].parse::<u32>() else {
            continue;
        };

        let Some((start, base_end)) = period_times(start_period) else {
            continue;
        };
        // 跨节次时结束时刻取下一锚点的结束时间（如有）
        let end = if end_period > start_period {
            period_times(start_period + 1)
                .map(|(_, e)| e)
                .unwrap_or(base_end)
        } else {
            base_end
        };

        slots.push(TimeSlot { day, start, end });
    }

    slots
}

/// 检查两门课程的上课时间是否冲突
///
/// 返回 (是否冲突, 冲突描述)。按嵌套顺序取第一对重叠的时间段；
/// 两边都解析不出任何时间段时视为不冲突（宽松策略，与导入端的
/// 容错行为保持一致）。
pub fn check_conflicts(course1_time: &str, course2_time: &str) -> (bool, String) {
    let slots1 = parse_time_slots(course1_time);
    let slots2 = parse_time_slots(course2_time);

    for slot1 in &slots1 {
        for slot2 in &slots2 {
            if slot1.overlaps(slot2) {
                return (
                    true,
                    format!(
                        "课程时间冲突：周{} {}-{}",
                        slot1.day,
                        slot1.start.format("%H:%M"),
                        slot1.end.format("%H:%M")
                    ),
                );
            }
        }
    }

    (false, String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_slot() {
        let slots = parse_time_slots("周一 1-2节");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].day, 1);
        assert_eq!(slots[0].start, hm(8, 0));
        assert_eq!(slots[0].end, hm(9, 40));
    }

    #[test]
    fn test_parse_multiple_slots() {
        let slots = parse_time_slots("周一 1-2节, 周三 3-4节");
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].day, 1);
        assert_eq!(slots[1].day, 3);
        assert_eq!(slots[1].start, hm(10, 0));
        assert_eq!(slots[1].end, hm(11, 40));
    }

    #[test]
    fn test_parse_evening_slot() {
        let slots = parse_time_slots("周五 9-10节");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].day, 5);
        assert_eq!(slots[0].start, hm(19, 0));
        assert_eq!(slots[0].end, hm(20, 40));
    }

    #[test]
    fn test_parse_skips_malformed_segments() {
        // 格式不符的段跳过，合法段保留
        let slots = parse_time_slots("待定, 周二 5-6节, 下午");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].day, 2);
        assert_eq!(slots[0].start, hm(14, 0));
    }

    #[test]
    fn test_parse_skips_unknown_weekday() {
        assert!(parse_time_slots("周天 1-2节").is_empty());
    }

    #[test]
    fn test_parse_skips_unmapped_period() {
        // 偶数起始节不在映射表中
        assert!(parse_time_slots("周四 4-5节").is_empty());
        assert!(parse_time_slots("周一 2-3节").is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_time_slots("").is_empty());
        assert!(parse_time_slots("待定").is_empty());
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let cases = [
            ("周一 1-2节", "周一 1-2节"),
            ("周一 1-2节", "周一 3-4节"),
            ("周三 5-6节", "周三 5-6节, 周五 7-8节"),
            ("星期格式错误", "周二 1-2节"),
        ];
        for (a, b) in cases {
            assert_eq!(
                check_conflicts(a, b).0,
                check_conflicts(b, a).0,
                "conflict({a}, {b}) 应与 conflict({b}, {a}) 一致"
            );
        }
    }

    #[test]
    fn test_different_days_never_overlap() {
        let (conflict, _) = check_conflicts("周一 1-2节", "周二 1-2节");
        assert!(!conflict);
    }

    #[test]
    fn test_touching_slots_do_not_overlap() {
        // 周一 1-2 节结束于 09:40，手工构造一个从 09:40 开始的时间段
        let a = TimeSlot {
            day: 1,
            start: hm(8, 0),
            end: hm(9, 40),
        };
        let b = TimeSlot {
            day: 1,
            start: hm(9, 40),
            end: hm(11, 40),
        };
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_adjacent_periods_do_not_conflict() {
        // 1-2节 (08:00-09:40) 与 3-4节 (10:00-11:40) 不冲突
        let (conflict, msg) = check_conflicts("周一 1-2节", "周一 3-4节");
        assert!(!conflict);
        assert!(msg.is_empty());
    }

    #[test]
    fn test_identical_slots_conflict() {
        let (conflict, msg) = check_conflicts("周四 5-6节", "周四 5-6节");
        assert!(conflict);
        assert_eq!(msg, "课程时间冲突：周4 14:00-15:40");
    }

    #[test]
    fn test_first_conflicting_pair_reported() {
        // 嵌套顺序下第一对冲突：左边第一个段 vs 右边第二个段
        let (conflict, msg) = check_conflicts("周一 1-2节, 周三 7-8节", "周五 5-6节, 周一 1-2节");
        assert!(conflict);
        assert_eq!(msg, "课程时间冲突：周1 08:00-09:40");
    }

    #[test]
    fn test_unparseable_input_means_no_conflict() {
        // 解析失败降级为"无冲突"，不向上抛错
        let (conflict, msg) = check_conflicts("时间待定", "周一 1-2节");
        assert!(!conflict);
        assert!(msg.is_empty());
    }
}
