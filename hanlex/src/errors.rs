//! エラー型の定義
//!
//! このモジュールは、hanlexで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt::{self, Debug};

/// hanlex専用のResult型
///
/// エラー型としてデフォルトで[`HanlexError`]を使用します。
pub type Result<T, E = HanlexError> = std::result::Result<T, E>;

/// hanlexのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// 各バリアントは特定のエラー条件に対応しています。
#[derive(Debug, thiserror::Error)]
pub enum HanlexError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 整数変換エラー
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// 整数パースエラー
    ///
    /// 辞書ソースの頻度欄が整数でない場合に発生します。
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),

    /// UTF-8エンコーディングエラー
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),

    /// I/Oエラー
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// rkyvシリアライゼーションエラー
    ///
    /// オートマトンの遷移表の読み書きに失敗した場合に発生します。
    #[error(transparent)]
    Rkyv(#[from] rkyv::rancor::Error),

    /// 一時ファイルの永続化エラー
    ///
    /// キャッシュファイルを所定のパスへ移動できなかった場合に発生します。
    #[error(transparent)]
    PathPersist(#[from] tempfile::PersistError),
}

impl HanlexError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_format() {
        let e = HanlexError::invalid_format("cache", "truncated record");
        assert_eq!(e.to_string(), "InvalidFormatError: cache: truncated record");
    }

    #[test]
    fn test_from_parse_int() {
        let e: HanlexError = "x".parse::<i32>().unwrap_err().into();
        assert!(matches!(e, HanlexError::ParseInt(_)));
    }
}
