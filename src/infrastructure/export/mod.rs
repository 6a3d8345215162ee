//! 表格导出
//!
//! 先把记录投影成与格式无关的 `SheetTable`，再写成 xlsx 工作簿

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde_json::Value;

use crate::business::domain::Donation;
use crate::shared::constants::export;
use crate::shared::utils::capitalize_header;

/// 导出错误
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to build workbook: {0}")]
    Workbook(String),

    #[error("Failed to load records: {0}")]
    Source(String),
}

impl From<XlsxError> for ExportError {
    fn from(err: XlsxError) -> Self {
        ExportError::Workbook(err.to_string())
    }
}

/// 单元格的值
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<Option<&Value>> for Cell {
    fn from(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Cell::Empty,
            Some(Value::String(s)) => Cell::Text(s.clone()),
            Some(Value::Bool(b)) => Cell::Bool(*b),
            Some(Value::Number(n)) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Some(other) => Cell::Text(other.to_string()),
        }
    }
}

/// 表头加数据行
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// 按列名从记录的 JSON 形式中取值
pub fn build_table(records: &[Donation], columns: &[String]) -> Result<SheetTable, ExportError> {
    let headers = columns.iter().map(|c| capitalize_header(c)).collect();

    let rows = records
        .iter()
        .map(|record| {
            let value = serde_json::to_value(record)?;
            Ok(columns
                .iter()
                .map(|column| Cell::from(value.get(column.as_str())))
                .collect())
        })
        .collect::<Result<Vec<_>, ExportError>>()?;

    Ok(SheetTable { headers, rows })
}

/// 写成单个工作表的 xlsx 文件
pub fn render_xlsx(table: &SheetTable) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(export::SHEET_NAME)?;

    for (index, header) in table.headers.iter().enumerate() {
        let col = column_index(index)?;
        worksheet.set_column_width(col, export::COLUMN_WIDTH)?;
        worksheet.write_string_with_format(0, col, header, &header_format)?;
    }

    for (row_index, row) in table.rows.iter().enumerate() {
        let row_number = u32::try_from(row_index + 1)
            .map_err(|_| ExportError::Workbook("too many rows".to_string()))?;
        for (index, cell) in row.iter().enumerate() {
            let col = column_index(index)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    worksheet.write_string(row_number, col, text)?;
                }
                Cell::Number(number) => {
                    worksheet.write_number(row_number, col, *number)?;
                }
                Cell::Bool(flag) => {
                    worksheet.write_boolean(row_number, col, *flag)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_index(index: usize) -> Result<u16, ExportError> {
    u16::try_from(index).map_err(|_| ExportError::Workbook("too many columns".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::domain::{NewDonation, Title};

    fn donation(first_name: Option<&str>, email: &str) -> Donation {
        let mut submission = NewDonation::new(Title::Ms);
        submission.first_name = first_name.map(str::to_string);
        submission.email = Some(email.to_string());
        Donation::from_submission(uuid::Uuid::new_v4(), submission, chrono::Utc::now())
    }

    #[test]
    fn test_table_has_requested_columns_and_one_row_per_record() {
        let records = vec![
            donation(Some("Asha"), "asha@example.com"),
            donation(Some("Ravi"), "ravi@example.com"),
            donation(None, "anon@example.com"),
        ];
        let columns = vec!["firstName".to_string(), "email".to_string()];

        let table = build_table(&records, &columns).unwrap();

        assert_eq!(table.headers, vec!["FirstName", "Email"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec![Cell::Text("Asha".into()), Cell::Text("asha@example.com".into())]);
        assert_eq!(table.rows[2][0], Cell::Empty);
    }

    #[test]
    fn test_native_cell_types_and_unknown_fields() {
        let records = vec![donation(Some("Asha"), "a@b.com")];
        let columns = vec!["isActive".to_string(), "nonexistent".to_string()];

        let table = build_table(&records, &columns).unwrap();

        assert_eq!(table.rows[0], vec![Cell::Bool(true), Cell::Empty]);
    }

    #[test]
    fn test_render_produces_zip_container() {
        let records = vec![donation(Some("Asha"), "a@b.com")];
        let table = build_table(&records, &["firstName".to_string()]).unwrap();

        let bytes = render_xlsx(&table).unwrap();

        assert!(bytes.starts_with(b"PK"));
    }
}
