//! ユーティリティ関数と型変換トレイトを提供するモジュール
//!
//! - `FromU32`: u32からの型変換トレイト
//! - `ByteReader`: キャッシュ読み込み用のビッグエンディアン整数リーダー

use crate::errors::{HanlexError, Result};

/// u32から他の型への変換を提供するトレイト
///
/// 標準ライブラリのFromトレイトとは異なり、プラットフォーム固有の仮定を行うことができます。
pub trait FromU32 {
    /// u32値から実装型を生成する
    fn from_u32(src: u32) -> Self;
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl FromU32 for usize {
    /// ポインタ幅が32ビットまたは64ビットであることが保証されているため、
    /// この変換は常に成功します。
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // Since the pointer width is guaranteed to be 32 or 64,
        // the following process always succeeds.
        unsafe { Self::try_from(src).unwrap_unchecked() }
    }
}

/// バイト列から先頭順にビッグエンディアンの整数を読み出すカーソル
///
/// 残りのバイトが足りない場合は、パニックせずに [`HanlexError::InvalidFormat`] を返します。
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    name: &'static str,
}

impl<'a> ByteReader<'a> {
    /// 新しいリーダーを作成します。`name`はエラーメッセージに使われます。
    pub fn new(bytes: &'a [u8], name: &'static str) -> Self {
        Self { bytes, name }
    }

    /// 先頭から`len`バイトを取り出します。
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.bytes.len() < len {
            return Err(HanlexError::invalid_format(
                self.name,
                format!("unexpected end of data: {len} bytes required, {} left", self.bytes.len()),
            ));
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    /// ビッグエンディアンの`i32`を一つ読み出します。
    pub fn next_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// 非負であるべき`i32`を読み出し、`usize`として返します。
    pub fn next_len(&mut self) -> Result<usize> {
        let n = self.next_i32()?;
        usize::try_from(n).map_err(|_| {
            HanlexError::invalid_format(self.name, format!("negative count {n}"))
        })
    }

    /// まだ読み出していないバイト列を返します。
    pub fn remaining(&self) -> &'a [u8] {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_reader() {
        let data = [0, 0, 0, 5, 0xFF, 0xFF, 0xFF, 0xFF, 1];
        let mut rdr = ByteReader::new(&data, "test");
        assert_eq!(rdr.next_len().unwrap(), 5);
        assert_eq!(rdr.next_i32().unwrap(), -1);
        assert_eq!(rdr.remaining(), &[1]);
        assert!(rdr.next_i32().is_err());
    }

    #[test]
    fn test_negative_len() {
        let data = (-3i32).to_be_bytes();
        let mut rdr = ByteReader::new(&data, "test");
        assert!(rdr.next_len().is_err());
    }
}
