//! Parser Module
//!
//! calamineを使用してワークブックのバイト列をシートごとの生グリッドに変換する。
//! 形式（xlsx / xlsm / xlsb / xls / ods）は内容から自動判別します。

mod workbook;

pub(crate) use workbook::WorkbookReader;
