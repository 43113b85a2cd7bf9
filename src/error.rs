//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// xlsxdualクレート全体で使用するエラー型
///
/// ワークブックの読み込み、解析、シート単位の描画、出力の直列化で発生する
/// すべてのエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - `Io` / `Parse` / `Zip` / `SecurityViolation`: ワークブック全体が読めない場合。
///   呼び出し元に返され、部分的なドキュメントは生成されません。
/// - `Render`: 1シートの描画に失敗した場合。`SheetPipeline`がインライン
///   エラーフラグメントに変換するため、通常は呼び出し元まで届きません。
/// - `Config`: ビルダー設定の検証に失敗した場合。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxdual::XlsxDualError;
/// use std::fs::File;
///
/// fn open_input(path: &str) -> Result<File, XlsxDualError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(file)
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxDualError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックの解析中に発生したエラー
    ///
    /// calamineがファイルを解析できなかった場合に発生します。
    /// ファイル形式が不正、破損したファイル、サポートされていない形式などが原因です。
    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    ///
    /// プレビューのデコード結果がUTF-8として不正な場合に発生します。
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Base64デコードエラー
    #[error("Preview decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// ZIPアーカイブの検査エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `ProcessorBuilder::build()`時に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsxdual::{ProcessorBuilder, XlsxDualError};
    ///
    /// let result = ProcessorBuilder::new()
    ///     .with_worker_count(0)  // 無効なワーカー数
    ///     .build();
    ///
    /// if let Err(XlsxDualError::Config(msg)) = result {
    ///     println!("設定エラー: {}", msg);
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// シート単位の描画エラー
    #[error("Failed to render sheet '{sheet}': {message}")]
    Render {
        /// エラーが発生したシート名
        sheet: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、入力サイズ上限などの制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// 出力レコードのJSON直列化エラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl XlsxDualError {
    /// シート名付きの描画エラーを生成する
    pub(crate) fn render(sheet: &str, message: impl Into<String>) -> Self {
        XlsxDualError::Render {
            sheet: sheet.to_string(),
            message: message.into(),
        }
    }
}

impl From<std::fmt::Error> for XlsxDualError {
    fn from(_: std::fmt::Error) -> Self {
        XlsxDualError::Io(std::io::Error::other("formatter error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: XlsxDualError = io_err.into();

        match error {
            XlsxDualError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: XlsxDualError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse workbook"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_render_error_carries_sheet() {
        let error = XlsxDualError::render("売上", "table too wide");
        match &error {
            XlsxDualError::Render { sheet, message } => {
                assert_eq!(sheet, "売上");
                assert_eq!(message, "table too wide");
            }
            _ => panic!("Expected Render error"),
        }
        assert!(error.to_string().contains("'売上'"));
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), XlsxDualError> {
            let _file = std::fs::File::open("nonexistent_file.xlsx")?;
            Ok(())
        }

        assert!(matches!(io_operation(), Err(XlsxDualError::Io(_))));
    }

    #[test]
    fn test_fmt_error_becomes_io() {
        let error: XlsxDualError = std::fmt::Error.into();
        assert!(matches!(error, XlsxDualError::Io(_)));
    }

    #[test]
    fn test_all_error_formats() {
        let io_err: XlsxDualError = io::Error::other("test io").into();
        assert!(io_err.to_string().starts_with("IO error"));

        let config_err = XlsxDualError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let security_err = XlsxDualError::SecurityViolation("too big".to_string());
        assert!(security_err.to_string().starts_with("Security violation"));

        let zip_err = XlsxDualError::Zip("bad header".to_string());
        assert!(zip_err.to_string().starts_with("ZIP archive error"));
    }
}
