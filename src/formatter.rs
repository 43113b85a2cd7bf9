//! Formatter Module
//!
//! calamineのセル値を、パイプラインが扱う閉じた値モデル（`CellValue`）に変換するモジュール。
//! 日付は表示文字列として確定させ、以降の段では型を解釈しません。

use calamine::{Data, ExcelDateTime};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::api::CellValue;
use crate::error::XlsxDualError;

/// セルフォーマッター
///
/// セル値変換のファサードとして機能します。
#[derive(Debug, Default)]
pub(crate) struct CellFormatter {
    date_formatter: DateFormatter,
}

impl CellFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// calamineのセル値を変換
    ///
    /// # 戻り値
    ///
    /// * `Ok(CellValue)` - 変換後の値
    /// * `Err(XlsxDualError)` - 日付シリアル値が表現可能な範囲を超えた場合
    pub fn convert(&self, cell: &Data) -> Result<CellValue, XlsxDualError> {
        #[allow(unreachable_patterns)]
        let value = match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::Error(e) => CellValue::Text(e.to_string()),
            Data::DateTime(dt) => self.convert_date_time(dt)?,
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Empty => CellValue::Empty,
            _ => CellValue::Empty,
        };
        Ok(value)
    }

    fn convert_date_time(&self, dt: &ExcelDateTime) -> Result<CellValue, XlsxDualError> {
        if dt.is_duration() {
            return Ok(CellValue::Number(dt.as_f64()));
        }
        self.date_formatter.format(dt.as_f64()).map(CellValue::Text)
    }
}

/// 9999-12-31の翌日に相当するシリアル値
const MAX_SERIAL: f64 = 2_958_466.0;

/// 日付フォーマッター
///
/// Excelのシリアル日付値（1900年システム）を文字列に変換します。
///
/// # エポックシステム
///
/// - 1899年12月30日起算。シリアル値61以降（1900-03-01以降）はそのまま日数を加算する
/// - Excelは存在しない1900-02-29をシリアル値60として数えるため、60未満は1日ずれる
#[derive(Debug, Default)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    /// シリアル値をフォーマット
    ///
    /// 時刻部分が0なら`YYYY-MM-DD`、それ以外は`YYYY-MM-DD HH:MM:SS`を返します。
    pub fn format(&self, serial_value: f64) -> Result<String, XlsxDualError> {
        let date_time = Self::to_date_time(serial_value)?;
        let formatted = if date_time.num_seconds_from_midnight() == 0 {
            date_time.format("%Y-%m-%d").to_string()
        } else {
            date_time.format("%Y-%m-%d %H:%M:%S").to_string()
        };
        Ok(formatted)
    }

    fn to_date_time(serial_value: f64) -> Result<NaiveDateTime, XlsxDualError> {
        let overflow = || {
            XlsxDualError::Config(format!(
                "Date calculation overflow: serial_value={}",
                serial_value
            ))
        };

        if !serial_value.is_finite() || !(0.0..MAX_SERIAL).contains(&serial_value) {
            return Err(overflow());
        }

        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| XlsxDualError::Config("Invalid epoch date".to_string()))?;

        let days = serial_value.floor() as i64;
        let days = if days < 60 { days + 1 } else { days };
        // 秒単位に丸める（浮動小数点誤差で59.9999秒になるのを防ぐ）
        let seconds = ((serial_value - serial_value.floor()) * 86_400.0).round() as i64;

        epoch
            .checked_add_signed(Duration::days(days))
            .and_then(|d| d.checked_add_signed(Duration::seconds(seconds)))
            .ok_or_else(overflow)
    }
}
