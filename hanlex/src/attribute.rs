//! 単語属性
//!
//! 辞書の各単語に付随する品詞と頻度の組の列を扱います。

use std::fmt;
use std::str::FromStr;

use crate::errors::{HanlexError, Result};
use crate::nature::Nature;

/// 単語の属性
///
/// (品詞, 頻度) の組の列と、頻度の総和を保持します。
/// 構築後は変更できません。常に`natures.len() == frequencies.len()`かつ
/// `total_frequency`が頻度の総和に等しくなります。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attribute {
    natures: Vec<Nature>,
    frequencies: Vec<u32>,
    total_frequency: u32,
}

impl Attribute {
    /// 頻度1の単一品詞からなる属性を作成します。
    pub fn new(nature: Nature) -> Self {
        Self::with_frequency(nature, 1)
    }

    /// 単一品詞と頻度から属性を作成します。
    pub fn with_frequency(nature: Nature, frequency: u32) -> Self {
        Self {
            natures: vec![nature],
            frequencies: vec![frequency],
            total_frequency: frequency,
        }
    }

    /// (品詞, 頻度) の組の列から属性を作成します。
    ///
    /// # エラー
    ///
    /// 以下の場合にエラーを返します:
    /// - 組が一つもない場合。
    /// - 同じ品詞が複数回現れる場合。
    /// - 頻度の総和が`u32`に収まらない場合。
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Nature, u32)>,
    {
        let mut natures = vec![];
        let mut frequencies = vec![];
        let mut total_frequency = 0u32;
        for (nature, frequency) in pairs {
            if natures.contains(&nature) {
                return Err(HanlexError::invalid_format(
                    "attribute",
                    format!("duplicated part-of-speech tag {nature}"),
                ));
            }
            total_frequency = total_frequency.checked_add(frequency).ok_or_else(|| {
                HanlexError::invalid_format("attribute", "total frequency overflows")
            })?;
            natures.push(nature);
            frequencies.push(frequency);
        }
        if natures.is_empty() {
            return Err(HanlexError::invalid_format(
                "attribute",
                "at least one (tag, frequency) pair is required",
            ));
        }
        Ok(Self {
            natures,
            frequencies,
            total_frequency,
        })
    }

    /// `tag freq tag freq ...` 形式のトークン列から属性を作成します。
    ///
    /// 組の数は`tokens.len() / 2`で、末尾の余ったトークンは無視されます。
    pub fn from_tokens<S>(tokens: &[S]) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let pairs = tokens
            .chunks_exact(2)
            .map(|pair| -> Result<(Nature, u32)> {
                let nature = pair[0].as_ref().parse::<Nature>()?;
                let frequency = pair[1].as_ref().parse::<u32>()?;
                Ok((nature, frequency))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_pairs(pairs)
    }

    /// 辞書ソースの1行のうち単語以降のフィールドから属性を作成します。
    ///
    /// 組が一つもない場合は`(default_nature, 1)`を返します。
    pub(crate) fn from_record_fields<S>(fields: &[S], default_nature: Nature) -> Result<Self>
    where
        S: AsRef<str>,
    {
        if fields.len() < 2 {
            return Ok(Self::new(default_nature));
        }
        Self::from_tokens(fields)
    }

    /// 組の数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.natures.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.natures.is_empty()
    }

    #[inline(always)]
    pub fn natures(&self) -> &[Nature] {
        &self.natures
    }

    #[inline(always)]
    pub fn frequencies(&self) -> &[u32] {
        &self.frequencies
    }

    #[inline(always)]
    pub const fn total_frequency(&self) -> u32 {
        self.total_frequency
    }

    /// (品詞, 頻度) の組を順に返すイテレータを取得します。
    pub fn iter(&self) -> impl Iterator<Item = (Nature, u32)> + '_ {
        self.natures
            .iter()
            .copied()
            .zip(self.frequencies.iter().copied())
    }

    /// 指定した品詞の頻度を返します。含まれない場合は0です。
    pub fn frequency_of(&self, nature: Nature) -> u32 {
        self.iter()
            .find(|&(n, _)| n == nature)
            .map_or(0, |(_, f)| f)
    }
}

impl FromStr for Attribute {
    type Err = HanlexError;

    /// `"nz 1 v 2"`のような文字列をパースします。
    fn from_str(s: &str) -> Result<Self> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        Self::from_tokens(&tokens)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (nature, frequency)) in self.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{nature} {frequency}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let attr: Attribute = "nz 1 v 2".parse().unwrap();
        assert_eq!(attr.natures(), &[Nature::Nz, Nature::V]);
        assert_eq!(attr.frequencies(), &[1, 2]);
        assert_eq!(attr.total_frequency(), 3);
        assert_eq!(attr.frequency_of(Nature::V), 2);
        assert_eq!(attr.frequency_of(Nature::N), 0);
        assert_eq!(attr.to_string(), "nz 1 v 2");
    }

    #[test]
    fn test_trailing_token_ignored() {
        let attr: Attribute = "n 10 v".parse().unwrap();
        assert_eq!(attr.len(), 1);
        assert_eq!(attr.total_frequency(), 10);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!("".parse::<Attribute>().is_err());
        assert!("nz".parse::<Attribute>().is_err());
        assert!("zz 1".parse::<Attribute>().is_err());
        assert!("nz x".parse::<Attribute>().is_err());
        assert!("nz -1".parse::<Attribute>().is_err());
        assert!("nz 1 nz 2".parse::<Attribute>().is_err());
    }

    #[test]
    fn test_record_fields_default() {
        let fields: [&str; 0] = [];
        let attr = Attribute::from_record_fields(&fields, Nature::Ns).unwrap();
        assert_eq!(attr, Attribute::new(Nature::Ns));
        assert_eq!(attr.total_frequency(), 1);

        let attr = Attribute::from_record_fields(&["ns"], Nature::N).unwrap();
        assert_eq!(attr, Attribute::new(Nature::N));

        let attr = Attribute::from_record_fields(&["v", "3", "n", "4"], Nature::N).unwrap();
        assert_eq!(attr.total_frequency(), 7);
    }

    #[test]
    fn test_len_is_empty() {
        let attr = Attribute::new(Nature::Nz);
        assert_eq!(attr.len(), 1);
        assert!(!attr.is_empty());

        let attr: Attribute = "n 1 v 2 a 3".parse().unwrap();
        assert_eq!(attr.len(), 3);
        assert!(!attr.is_empty());
    }
}
