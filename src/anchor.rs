//! Anchor Module
//!
//! シートごとのドキュメント内アンカーIDを発行する。
//!
//! 発行はディスパッチャーが作業開始前にまとめて行うため、ワーカー間で
//! 共有される可変状態はありません。シードを指定すると、同じワークブックに
//! 対して常に同じIDの列が得られます。

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// アンカーIDの接頭辞
const SHEET_PREFIX: &str = "sheet_";

/// エラーフラグメントIDの接頭辞
const ERROR_PREFIX: &str = "error_";

/// 1シート分のアンカー
///
/// 正常フラグメントは`sheet_<suffix>`、エラーフラグメントは`error_<suffix>`を使います。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetAnchor {
    suffix: String,
}

impl SheetAnchor {
    /// 目次とフラグメントで共有するID
    pub fn id(&self) -> String {
        format!("{}{}", SHEET_PREFIX, self.suffix)
    }

    /// エラーフラグメント用のID
    pub fn error_id(&self) -> String {
        format!("{}{}", ERROR_PREFIX, self.suffix)
    }
}

/// アンカー発行器
///
/// 同一ドキュメント内で重複しない接尾辞を発行します。
#[derive(Debug)]
pub struct AnchorRegistry {
    issued: HashSet<u32>,
    rng: StdRng,
}

impl AnchorRegistry {
    /// 発行器を生成
    ///
    /// # 引数
    ///
    /// * `seed` - `Some`の場合は決定的な列を発行する。`None`の場合はOSの乱数で初期化する
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            issued: HashSet::new(),
            rng,
        }
    }

    /// 未使用のアンカーを1つ発行する
    pub fn issue(&mut self) -> SheetAnchor {
        loop {
            let candidate: u32 = self.rng.gen();
            if self.issued.insert(candidate) {
                return SheetAnchor {
                    suffix: format!("{:08x}", candidate),
                };
            }
        }
    }

    /// 発行済みの数
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_format() {
        let anchor = AnchorRegistry::new(Some(1)).issue();
        let id = anchor.id();
        assert!(id.starts_with("sheet_"));
        assert_eq!(id.len(), "sheet_".len() + 8);
        assert!(id["sheet_".len()..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(anchor.error_id(), id.replacen("sheet_", "error_", 1));
    }

    #[test]
    fn test_issued_anchors_are_unique() {
        let mut registry = AnchorRegistry::new(None);
        let ids: HashSet<String> = (0..2000).map(|_| registry.issue().id()).collect();
        assert_eq!(ids.len(), 2000);
        assert_eq!(registry.len(), 2000);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let mut a = AnchorRegistry::new(Some(42));
        let mut b = AnchorRegistry::new(Some(42));
        for _ in 0..10 {
            assert_eq!(a.issue(), b.issue());
        }
    }
}
