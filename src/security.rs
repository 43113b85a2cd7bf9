//! Security Module
//!
//! 入力ワークブックに対するセキュリティ対策を実装するモジュール。
//! ZIP bomb攻撃、パストラバーサル攻撃、過大な入力への対策を提供します。

use std::io::Cursor;

use tracing::warn;
use zip::ZipArchive;

use crate::error::XlsxDualError;

/// ZIPローカルファイルヘッダーのシグネチャ（xlsx / xlsm / xlsb / ods）
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 1GB (1_073_741_824 bytes)
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824, // 1GB
            max_file_count: 10_000,
            max_file_size: 104_857_600,         // 100MB
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

impl SecurityConfig {
    /// 入力サイズ上限だけを差し替えた設定を作成
    pub fn with_max_input_file_size(max_input_file_size: u64) -> Self {
        Self {
            max_input_file_size,
            ..Self::default()
        }
    }

    /// 入力バイト列を検査する
    ///
    /// 1. 入力サイズの上限
    /// 2. ZIPコンテナの場合はエントリ数・エントリサイズ・展開後合計サイズ・エントリパス
    ///
    /// ZIPでない入力（xlsなど）はサイズ検査のみ行い、判定はデコーダーに委ねます。
    pub fn inspect(&self, bytes: &[u8]) -> Result<(), XlsxDualError> {
        if bytes.len() as u64 > self.max_input_file_size {
            return Err(violation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes.len(),
                self.max_input_file_size
            )));
        }

        if bytes.starts_with(ZIP_SIGNATURE) {
            self.inspect_archive(bytes)?;
        }

        Ok(())
    }

    fn inspect_archive(&self, bytes: &[u8]) -> Result<(), XlsxDualError> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(|e| XlsxDualError::Zip(format!("{}", e)))?;

        // ファイル数の上限
        if archive.len() > self.max_file_count {
            return Err(violation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total_decompressed_size: u64 = 0;
        for i in 0..archive.len() {
            let file = archive
                .by_index(i)
                .map_err(|e| XlsxDualError::Zip(format!("{}", e)))?;
            let file_name = file.name();

            validate_zip_path(file_name)
                .map_err(|e| violation(format!("Invalid ZIP path: {}", e)))?;

            let file_size = file.size();
            if file_size > self.max_file_size {
                return Err(violation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file_name, file_size, self.max_file_size
                )));
            }

            total_decompressed_size = total_decompressed_size
                .checked_add(file_size)
                .ok_or_else(|| violation("Total decompressed size calculation overflow".to_string()))?;

            if total_decompressed_size > self.max_decompressed_size {
                return Err(violation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

fn violation(message: String) -> XlsxDualError {
    warn!(reason = %message, "input rejected by security check");
    XlsxDualError::SecurityViolation(message)
}

/// ファイルパスの検証
///
/// パストラバーサル攻撃を防ぐため、ファイルパスを検証します。
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`や絶対パスを含む）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // Unix形式の`/`、またはドライブレター付きのパス
    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
