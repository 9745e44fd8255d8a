// ==========================================
// 卫星过境排程系统 - 候选过境 CSV 解析
// ==========================================
// 列: satellite_norad_id, ground_station, start_time, end_time
// 时间: RFC3339（带时区）；不带时区的 ISO 时间按 UTC 解释
// 规则: 表头大小写不敏感；完全空白的行跳过；任一行不合法则整个文件失败
// ==========================================

use crate::domain::pass::PassRequest;
use crate::domain::types::NoradId;
use crate::importer::error::{ImportError, ImportResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const COL_SATELLITE: &str = "satellite_norad_id";
pub const COL_STATION: &str = "ground_station";
pub const COL_START: &str = "start_time";
pub const COL_END: &str = "end_time";

/// 解析 UTC 时间戳
///
/// 接受 RFC3339（任意时区，转换为 UTC），以及 `YYYY-MM-DDTHH:MM:SS` /
/// `YYYY-MM-DD HH:MM:SS`（视为 UTC）。
pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub struct PassCsvParser;

impl PassCsvParser {
    /// 解析 CSV 文件
    pub fn parse_file(&self, file_path: &Path) -> ImportResult<Vec<PassRequest>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        if let Some(ext) = file_path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        self.parse_reader(file)
    }

    /// 从任意输入解析
    pub fn parse_reader<R: Read>(&self, input: R) -> ImportResult<Vec<PassRequest>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let column = |name: &str| -> ImportResult<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ImportError::MissingColumn(name.to_string()))
        };
        let sat_col = column(COL_SATELLITE)?;
        let station_col = column(COL_STATION)?;
        let start_col = column(COL_START)?;
        let end_col = column(COL_END)?;

        let mut requests = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            // 表头为第 1 行
            let row = idx + 2;

            if record.iter().all(|v| v.is_empty()) {
                continue;
            }
            let field = |col: usize| record.get(col).unwrap_or("");

            let satellite_norad_id: NoradId =
                field(sat_col)
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ImportError::TypeConversionError {
                        row,
                        field: COL_SATELLITE.to_string(),
                        message: e.to_string(),
                    })?;

            let ground_station = field(station_col).to_string();
            if ground_station.is_empty() {
                return Err(ImportError::TypeConversionError {
                    row,
                    field: COL_STATION.to_string(),
                    message: "地面站不能为空".to_string(),
                });
            }

            let timestamp = |col: usize, name: &str| {
                parse_utc_timestamp(field(col)).ok_or_else(|| ImportError::DateFormatError {
                    row,
                    field: name.to_string(),
                    value: field(col).to_string(),
                })
            };
            let start_time = timestamp(start_col, COL_START)?;
            let end_time = timestamp(end_col, COL_END)?;

            requests.push(PassRequest::new(
                satellite_norad_id,
                ground_station,
                start_time,
                end_time,
            ));
        }

        tracing::debug!(rows = requests.len(), "候选过境 CSV 解析完成");
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn test_parse_rfc3339_and_naive() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_utc_timestamp("2030-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_utc_timestamp("2030-01-02T11:04:05+08:00"), Some(expected));
        assert_eq!(parse_utc_timestamp("2030-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_utc_timestamp("next tuesday"), None);
    }

    #[test]
    fn test_parse_reader() {
        let data = "\
Satellite_NORAD_ID,ground_station,start_time,end_time
25544, GS1 ,2030-01-01T10:00:00Z,2030-01-01T10:10:00Z
,,,
43013,GS2,2030-01-01T11:00:00Z,2030-01-01T11:12:00Z
";
        let requests = PassCsvParser.parse_reader(data.as_bytes()).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].satellite_norad_id, 25544);
        assert_eq!(requests[0].ground_station, "GS1");
        assert_eq!(requests[1].ground_station, "GS2");
    }

    #[test]
    fn test_missing_column() {
        let data = "satellite_norad_id,ground_station,start_time\n1,GS1,2030-01-01T10:00:00Z\n";
        let err = PassCsvParser.parse_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(c) if c == "end_time"));
    }

    #[test]
    fn test_bad_timestamp_reports_row() {
        let data = "\
satellite_norad_id,ground_station,start_time,end_time
1,GS1,2030-01-01T10:00:00Z,2030-01-01T10:10:00Z
2,GS1,yesterday,2030-01-01T10:10:00Z
";
        let err = PassCsvParser.parse_reader(data.as_bytes()).unwrap_err();
        match err {
            ImportError::DateFormatError { row, field, .. } => {
                assert_eq!(row, 3);
                assert_eq!(field, "start_time");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_file_checks_extension() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "satellite_norad_id,ground_station,start_time,end_time").unwrap();
        let err = PassCsvParser.parse_file(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));

        let missing = PassCsvParser.parse_file(Path::new("no_such_passes.csv"));
        assert!(matches!(missing, Err(ImportError::FileNotFound(_))));
    }
}
