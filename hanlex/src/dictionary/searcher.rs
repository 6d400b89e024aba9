//! 動的トライに対する逐次的な接頭辞検索

use std::collections::VecDeque;
use std::ops::Deref;

use crate::dictionary::prefix_trie::PrefixTrie;

/// [`PrefixSearcher`]が返す一致
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixMatch<V> {
    /// 開始位置(文字単位)
    pub begin: usize,
    /// 終了位置(文字単位、この位置は含まない)
    pub end: usize,
    /// 一致した単語
    pub word: String,
    /// 単語の値
    pub value: V,
}

/// テキストを先頭から走査し、各位置で動的トライの接頭辞検索を遅延実行するカーソル
///
/// 位置`k`の一致をすべて返し終えてから位置`k + 1`を検索するため、一致は
/// 開始位置の昇順、同じ開始位置では短い順に得られます。
/// 最後まで走査したカーソルを巻き戻すことはできません。
///
/// `T`はトライへの参照、またはロックガードのようなトライへの参照を返す型です。
pub struct PrefixSearcher<T, V> {
    trie: T,
    chars: Vec<char>,
    position: usize,
    pending: VecDeque<(String, V)>,
    offset: usize,
}

impl<T, V> PrefixSearcher<T, V>
where
    T: Deref<Target = PrefixTrie<V>>,
    V: Clone,
{
    /// 新しいカーソルを作成します。
    pub fn new(trie: T, text: &str) -> Self {
        Self::from_chars(trie, text.chars().collect())
    }

    /// 文字の列から新しいカーソルを作成します。
    pub fn from_chars(trie: T, chars: Vec<char>) -> Self {
        Self {
            trie,
            chars,
            position: 0,
            pending: VecDeque::new(),
            offset: 0,
        }
    }

    /// 直前に返した一致の開始位置を返します。
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 走査対象の文字列を返します。
    #[inline(always)]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl<T, V> Iterator for PrefixSearcher<T, V>
where
    T: Deref<Target = PrefixTrie<V>>,
    V: Clone,
{
    type Item = PrefixMatch<V>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pending.is_empty() && self.position < self.chars.len() {
            self.pending = self
                .trie
                .common_prefix_search(&self.chars, self.position)
                .into_iter()
                .map(|(word, value)| (word, value.clone()))
                .collect();
            self.position += 1;
        }
        let (word, value) = self.pending.pop_front()?;
        self.offset = self.position - 1;
        Some(PrefixMatch {
            begin: self.offset,
            end: self.offset + word.chars().count(),
            word,
            value,
        })
    }
}
