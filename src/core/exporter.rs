use crate::domain::model::{Record, Table};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use serde_json::{Number, Value};
use std::collections::HashSet;

/// 含巢狀 list/dict 的已知欄位，輸出前一律轉成文字
pub const NESTED_COLUMNS: [&str; 2] = ["similars", "tags"];

/// 所有記錄鍵的聯集，依首次出現順序
pub fn union_columns(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for key in record.data.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

pub fn build_table(records: &[Record]) -> Table {
    let columns = union_columns(records);
    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| match record.data.get(column) {
                    Some(value) if NESTED_COLUMNS.contains(&column.as_str()) => {
                        nested_cell(value)
                    }
                    Some(value) => cell_text(value),
                    None => String::new(),
                })
                .collect()
        })
        .collect();

    Table { columns, rows }
}

pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    if table.columns.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e.error()),
    })
}

/// 巢狀欄位：空值（None、空 list、0、false…）輸出空字串，其餘轉成文字
pub fn nested_cell(value: &Value) -> String {
    if is_truthy(value) {
        cell_text(value)
    } else {
        String::new()
    }
}

/// 單一儲存格的文字：字串原樣輸出，list/dict 以 Python literal 表示
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => python_repr(other),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub fn python_repr(value: &Value) -> String {
    let mut out = String::new();
    write_repr(value, &mut out);
    out
}

fn write_repr(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&number_text(n)),
        Value::String(s) => write_str_repr(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_str_repr(key, out);
                out.push_str(": ");
                write_repr(item, out);
            }
            out.push('}');
        }
    }
}

fn write_str_repr(s: &str, out: &mut String) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// 浮點數指數格式對齊 Python：`1e-05`、`1e+16`
fn number_text(n: &Number) -> String {
    if !n.is_f64() {
        return n.to_string();
    }

    // |x| < 1e-4 即改用指數表示；ryu 的門檻更小
    let text = match n.as_f64() {
        Some(f) if f != 0.0 && f.abs() < 1e-4 => format!("{:e}", f),
        _ => n.to_string(),
    };

    match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent.trim_start_matches('+')),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// 把表格寫成 CSV 檔
pub struct TabularExporter<S: Storage> {
    storage: S,
}

impl<S: Storage> TabularExporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn export(&self, table: &Table, file_name: &str) -> Result<usize> {
        let bytes = to_csv(table)?;
        tracing::debug!(
            "Writing {} rows x {} columns ({} bytes) to {}",
            table.rows.len(),
            table.columns.len(),
            bytes.len(),
            file_name
        );
        self.storage.write_file(file_name, &bytes).await?;
        Ok(bytes.len())
    }
}
