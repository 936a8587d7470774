// ==========================================
// 徒步旅行预订系统 - 导入层
// ==========================================
// 从 Excel / CSV 批量导入余位日历
// ==========================================

pub mod calendar_importer;
pub mod error;
pub mod file_parser;

pub use calendar_importer::{CalendarImporter, ImportReport, RowError};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
