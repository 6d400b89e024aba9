//! # hanlex
//!
//! hanlexは、中国語の単語分割で使われるカスタム単語辞書の実装です。
//!
//! ## 概要
//!
//! 単語とその属性(品詞と頻度の組)を収録し、次の二つの問い合わせを高速に処理します。
//!
//! - ある文字列が既知の単語かどうかの判定
//! - テキストを一度走査して、すべての位置で一致するすべての単語を列挙すること
//!
//! 一括読み込みした大量の単語はダブル配列Aho-Corasickオートマトンに格納され、
//! 実行時に追加・削除される単語は動的な接頭辞トライに格納されます。
//! 構築したオートマトンはバイナリキャッシュに書き出され、次回以降の起動ではそこから読み込まれます。
//!
//! ## 主な機能
//!
//! - **線形時間の全一致走査**: 重なり合う一致や入れ子になった一致もすべて報告
//! - **動的な単語の追加と削除**: 読み書きロックによりスレッド間で共有可能
//! - **高速な起動**: rkyvとSHA-256で検証されるバイナリキャッシュ
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::collections::BTreeMap;
//!
//! use hanlex::{Attribute, CustomDictionary, DoubleArrayAutomaton};
//!
//! let mut map = BTreeMap::new();
//! map.insert("中国".to_string(), "ns 100".parse::<Attribute>()?);
//! map.insert("中国人".to_string(), "n 20".parse::<Attribute>()?);
//! let dict = CustomDictionary::new(DoubleArrayAutomaton::from_map(map)?);
//!
//! dict.insert("人民", "n 50");
//!
//! let hits = dict.parse_text_sorted("中国人民");
//! let spans: Vec<(usize, usize)> = hits.iter().map(|h| (h.begin, h.end)).collect();
//! assert_eq!(spans, vec![(0, 2), (0, 3), (2, 4)]);
//! assert_eq!(hits[1].value.total_frequency(), 20);
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// 単語属性
pub mod attribute;

/// カスタム辞書とその構成要素
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 品詞
pub mod nature;

/// 内部ユーティリティ関数
pub mod utils;

#[cfg(test)]
mod tests;

// Re-exports
pub use attribute::Attribute;
pub use dictionary::{CustomDictionary, DictionaryConfig, DoubleArrayAutomaton, Hit};
pub use errors::{HanlexError, Result};
pub use nature::Nature;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
