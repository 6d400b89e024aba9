//! hanlexのテストモジュール群
//!
//! 辞書の読み込みから検索までを通して、各コンポーネントの組み合わせを検証します。
