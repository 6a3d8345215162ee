//! 工具函数模块

use chrono::NaiveDate;

/// 将字段名转换为表头：首字母大写，其余保持不变
pub fn capitalize_header(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 格式化预约日期为 `DD-MM-YYYY`，无法解析时原样返回
pub fn format_pickup_date(date: &str) -> String {
    let trimmed = date.trim();
    let prefix = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|_| trimmed.to_string())
}

/// 将 `9-11` 形式的时间段格式化为 `9 AM - 11 AM`
pub fn format_time_slot(slot: &str) -> String {
    slot.split('-')
        .map(|part| format_hour(part.trim()))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn format_hour(part: &str) -> String {
    let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u32>() {
        Ok(hour) if hour < 24 => {
            let suffix = if hour < 12 { "AM" } else { "PM" };
            let display = match hour % 12 {
                0 => 12,
                h => h,
            };
            format!("{} {}", display, suffix)
        }
        _ => part.to_string(),
    }
}

/// 转义插入HTML模板的用户输入
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 非空白字符串才视为有效值
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
