//! 基本辞書
//!
//! カスタム辞書は、基本辞書にすでに含まれる単語を重複して収録しません。
//! ここでは基本辞書への問い合わせを単語の所属判定だけに限定したトレイトと、
//! その実装をいくつか提供します。

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use hashbrown::HashSet;

use crate::errors::Result;

/// 基本辞書への問い合わせ
pub trait BaseDictionary {
    /// 単語が基本辞書に含まれるかを返します。
    fn contains(&self, word: &str) -> bool;
}

/// 単語を一つも含まない基本辞書
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBase;

impl BaseDictionary for NoBase {
    #[inline(always)]
    fn contains(&self, _word: &str) -> bool {
        false
    }
}

impl<F> BaseDictionary for F
where
    F: Fn(&str) -> bool,
{
    #[inline(always)]
    fn contains(&self, word: &str) -> bool {
        self(word)
    }
}

/// 単語の集合による基本辞書
#[derive(Clone, Debug, Default)]
pub struct WordSet {
    words: HashSet<String>,
}

impl WordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 単語を追加します。新たに追加された場合は`true`を返します。
    pub fn insert<S>(&mut self, word: S) -> bool
    where
        S: Into<String>,
    {
        self.words.insert(word.into())
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// 1行1語の単語リストを読み込みます。
    ///
    /// 各行の最初の空白区切りのフィールドを単語とするため、
    /// `word tag freq ...`形式の辞書ファイルもそのまま読み込めます。空行は無視されます。
    ///
    /// # エラー
    ///
    /// 読み込みに失敗した場合、またはUTF-8として不正な行がある場合にエラーを返します。
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut words = Self::new();
        for line in BufReader::new(rdr).split(b'\n') {
            let line = line?;
            let line = std::str::from_utf8(&line)?;
            if let Some(word) = line.split_whitespace().next() {
                words.insert(word.trim_start_matches('\u{feff}'));
            }
        }
        Ok(words)
    }

    /// ファイルから単語リストを読み込みます。
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::from_reader(File::open(path)?)
    }
}

impl BaseDictionary for WordSet {
    #[inline(always)]
    fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

impl<S> FromIterator<S> for WordSet
where
    S: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}
