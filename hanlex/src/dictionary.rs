//! カスタム辞書モジュール
//!
//! このモジュールは、単語とその属性(品詞と頻度)を収録するカスタム辞書を提供します。
//! カスタム辞書は次の二つの構造から成ります:
//!
//! - 一括読み込み時に構築される、変更不可能なダブル配列Aho-Corasickオートマトン
//! - 実行時に単語を追加・削除できる動的な接頭辞トライ
//!
//! # 辞書の読み込み方法
//!
//! - [`CustomDictionary::load`]: キャッシュを優先して読み込み、なければソースから構築する
//! - [`CustomDictionary::load_or_empty`]: 読み込みに失敗した場合は空の辞書を返す
//! - [`CustomDictionary::new`]: 構築済みのオートマトンから作成する
//!
//! # キャッシュ
//!
//! ソースから構築したオートマトンは、一次ソースのパスに`.bin`を付けたファイルに
//! 書き出されます。形式は [`cache`] モジュールを参照してください。
pub mod automaton;
pub mod base;
pub mod cache;
pub mod config;
pub mod loader;
pub mod prefix_trie;
pub mod searcher;

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::attribute::Attribute;
use crate::errors::Result;
use crate::nature::Nature;

pub use crate::dictionary::automaton::{DoubleArrayAutomaton, Hit};
pub use crate::dictionary::base::{BaseDictionary, NoBase, WordSet};
pub use crate::dictionary::config::{DictionaryConfig, DictionarySource};
pub use crate::dictionary::prefix_trie::PrefixTrie;
pub use crate::dictionary::searcher::{PrefixMatch, PrefixSearcher};

/// 1引数の [`CustomDictionary::add_word`] と [`CustomDictionary::insert_word`] で使われる属性の品詞
pub const DEFAULT_WORD_NATURE: Nature = Nature::Nz;

/// 動的トライへの読み取りロックを保持したまま走査する [`PrefixSearcher`]
pub type DictionarySearcher<'a> = PrefixSearcher<RwLockReadGuard<'a, PrefixTrie<Attribute>>, Attribute>;

/// カスタム辞書
///
/// オートマトンは構築後に変更されないため、ロックなしで共有されます。
/// 動的トライは読み書きロックで保護されており、`&self`のまま複数スレッドから
/// 追加・削除・検索を行うことができます。
///
/// # 例
///
/// ```
/// use hanlex::CustomDictionary;
///
/// let dict = CustomDictionary::empty();
/// assert!(dict.add("裸婚", "nz 1"));
/// assert!(!dict.add("裸婚", "v 2"));
/// assert!(dict.contains("裸婚"));
///
/// let mut hits = vec![];
/// dict.parse_text("我们裸婚吧", |begin, end, _| hits.push((begin, end)));
/// assert_eq!(hits, vec![(2, 4)]);
/// ```
pub struct CustomDictionary {
    automaton: DoubleArrayAutomaton<Attribute>,
    trie: RwLock<PrefixTrie<Attribute>>,
}

impl CustomDictionary {
    /// 構築済みのオートマトンから辞書を作成します。動的トライは空です。
    pub fn new(automaton: DoubleArrayAutomaton<Attribute>) -> Self {
        Self {
            automaton,
            trie: RwLock::new(PrefixTrie::new()),
        }
    }

    /// 空の辞書を作成します。
    pub fn empty() -> Self {
        Self::new(DoubleArrayAutomaton::empty())
    }

    /// 設定に従って辞書を読み込みます。
    ///
    /// キャッシュファイルが有効であればそれを使い、そうでなければ全ソースを読み込んで
    /// オートマトンを構築し、キャッシュを書き出します。
    ///
    /// # 引数
    ///
    /// * `config` - 辞書ソースの設定
    /// * `base` - 基本辞書。ここに含まれる単語はソースから読み込まれません。
    ///
    /// # エラー
    ///
    /// キャッシュが使えず、一次ソースの読み込みまたはオートマトンの構築に失敗した場合にエラーを返します。
    pub fn load<B>(config: &DictionaryConfig, base: &B) -> Result<Self>
    where
        B: BaseDictionary + ?Sized,
    {
        loader::load(config, base).map(Self::new)
    }

    /// [`load`](Self::load)と同様ですが、失敗した場合はエラーログを記録して空の辞書を返します。
    pub fn load_or_empty<B>(config: &DictionaryConfig, base: &B) -> Self
    where
        B: BaseDictionary + ?Sized,
    {
        Self::load(config, base).unwrap_or_else(|e| {
            log::error!(
                "[hanlex] Failed to load the custom dictionary {}: {e}",
                config.primary_path().display()
            );
            Self::empty()
        })
    }

    fn read_trie(&self) -> RwLockReadGuard<'_, PrefixTrie<Attribute>> {
        self.trie.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_trie(&self) -> RwLockWriteGuard<'_, PrefixTrie<Attribute>> {
        self.trie.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 単語がオートマトンまたは動的トライに含まれるかを返します。
    pub fn contains(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        self.automaton.exact_match(word).is_some() || self.read_trie().contains_key(word)
    }

    /// 動的トライに収録された単語の属性を返します。
    ///
    /// オートマトンに収録された単語は対象外です。オートマトンの単語は
    /// [`automaton`](Self::automaton)から参照できます。
    pub fn get(&self, word: &str) -> Option<Attribute> {
        self.read_trie().get(word).cloned()
    }

    /// 辞書に含まれない単語を動的トライに追加します。
    ///
    /// # 引数
    ///
    /// * `word` - 追加する単語
    /// * `nature_with_frequency` - `"nz 1 v 2"`のような品詞と頻度の列
    ///
    /// # 戻り値
    ///
    /// 追加した場合は`true`。単語がすでに含まれている場合、または
    /// `nature_with_frequency`が不正な場合は`false`。
    pub fn add(&self, word: &str, nature_with_frequency: &str) -> bool {
        parse_attribute(word, nature_with_frequency)
            .is_some_and(|attr| self.add_attribute(word, attr))
    }

    /// 属性`(nz, 1)`で [`add`](Self::add) を行います。
    pub fn add_word(&self, word: &str) -> bool {
        self.add_attribute(word, Attribute::new(DEFAULT_WORD_NATURE))
    }

    /// 属性を指定して [`add`](Self::add) を行います。
    pub fn add_attribute(&self, word: &str, attr: Attribute) -> bool {
        if self.automaton.exact_match(word).is_some() {
            return false;
        }
        self.write_trie().insert(word, attr, false)
    }

    /// 単語を動的トライに追加します。すでに動的トライにある場合は属性を置き換えます。
    ///
    /// # 戻り値
    ///
    /// 格納した場合は`true`。単語が空の場合、または`nature_with_frequency`が不正な場合は`false`。
    pub fn insert(&self, word: &str, nature_with_frequency: &str) -> bool {
        parse_attribute(word, nature_with_frequency)
            .is_some_and(|attr| self.insert_attribute(word, attr))
    }

    /// 属性`(nz, 1)`で [`insert`](Self::insert) を行います。
    pub fn insert_word(&self, word: &str) -> bool {
        self.insert_attribute(word, Attribute::new(DEFAULT_WORD_NATURE))
    }

    /// 属性を指定して [`insert`](Self::insert) を行います。
    pub fn insert_attribute(&self, word: &str, attr: Attribute) -> bool {
        self.write_trie().insert(word, attr, true)
    }

    /// 動的トライから単語を削除します。オートマトンの単語は削除できません。
    ///
    /// # 戻り値
    ///
    /// 単語が削除された場合は`true`。
    pub fn remove(&self, word: &str) -> bool {
        self.write_trie().remove(word).is_some()
    }

    /// `text`の接頭辞になっている動的トライの単語を短い順に返します。
    pub fn common_prefix_search(&self, text: &str) -> Vec<(String, Attribute)> {
        let chars: Vec<char> = text.chars().collect();
        self.common_prefix_search_at(&chars, 0)
    }

    /// `text[begin..]`の接頭辞になっている動的トライの単語を短い順に返します。
    pub fn common_prefix_search_at(&self, text: &[char], begin: usize) -> Vec<(String, Attribute)> {
        self.read_trie()
            .common_prefix_search(text, begin)
            .into_iter()
            .map(|(word, attr)| (word, attr.clone()))
            .collect()
    }

    /// 動的トライに対する逐次的な接頭辞検索のカーソルを返します。
    ///
    /// カーソルは動的トライの読み取りロックを保持します。カーソルを保持したまま同じスレッドで
    /// [`add`](Self::add)などの更新を行うとデッドロックするため、更新の前にカーソルを破棄してください。
    pub fn searcher(&self, text: &str) -> DictionarySearcher<'_> {
        PrefixSearcher::new(self.read_trie(), text)
    }

    /// テキスト中のすべての一致を`hit(begin, end, attribute)`で報告します。
    ///
    /// 先にオートマトンの一致を終了位置の順に報告し、続けて動的トライの一致を
    /// 開始位置の順に報告します。全体としては位置の順に並びません。
    /// 位置の順に並んだ結果が必要な場合は [`parse_text_sorted`](Self::parse_text_sorted) を使ってください。
    ///
    /// 動的トライの一致は、一つの読み取りロックの下で得られた一貫した状態から報告されます。
    pub fn parse_text<F>(&self, text: &str, mut hit: F)
    where
        F: FnMut(usize, usize, &Attribute),
    {
        let chars: Vec<char> = text.chars().collect();
        self.automaton.scan_chars(&chars, &mut hit);
        let trie = self.read_trie();
        for m in PrefixSearcher::from_chars(&*trie, chars) {
            hit(m.begin, m.end, &m.value);
        }
    }

    /// テキスト中のすべての一致を、開始位置、終了位置の順に並べて返します。
    pub fn parse_text_sorted(&self, text: &str) -> Vec<Hit<Attribute>> {
        let mut hits = vec![];
        self.parse_text(text, |begin, end, attr| {
            hits.push(Hit {
                begin,
                end,
                value: attr.clone(),
            });
        });
        hits.sort_by_key(|h| (h.begin, h.end));
        hits
    }

    /// オートマトンに収録された単語数を返します。
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.automaton.size()
    }

    /// 動的トライに収録された単語数を返します。
    pub fn dynamic_len(&self) -> usize {
        self.read_trie().len()
    }

    #[inline(always)]
    pub fn automaton(&self) -> &DoubleArrayAutomaton<Attribute> {
        &self.automaton
    }
}

impl Default for CustomDictionary {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for CustomDictionary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CustomDictionary")
            .field("automaton", &self.automaton)
            .field("dynamic_len", &self.dynamic_len())
            .finish()
    }
}

fn parse_attribute(word: &str, nature_with_frequency: &str) -> Option<Attribute> {
    nature_with_frequency
        .parse()
        .inspect_err(|e| log::debug!("[hanlex] Rejected the attribute of {word:?}: {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    fn dictionary() -> CustomDictionary {
        let mut map = BTreeMap::new();
        map.insert("中国".to_string(), "ns 100".parse().unwrap());
        map.insert("中国人".to_string(), "n 20".parse().unwrap());
        map.insert("人民".to_string(), "n 50".parse().unwrap());
        CustomDictionary::new(DoubleArrayAutomaton::from_map(map).unwrap())
    }

    #[test]
    fn test_contains_both_tiers() {
        let dict = dictionary();
        assert!(dict.contains("中国"));
        assert!(!dict.contains("国人"));
        assert!(dict.insert("国人", "n 1"));
        assert!(dict.contains("国人"));
        assert!(!dict.contains(""));
    }

    #[test]
    fn test_get_dynamic_only() {
        let dict = dictionary();
        assert_eq!(dict.get("中国"), None);
        assert!(dict.automaton().get("中国").is_some());
        assert!(dict.insert_word("新词"));
        assert_eq!(dict.get("新词"), Some(Attribute::new(Nature::Nz)));
    }

    #[test]
    fn test_add_rejects_known_words() {
        let dict = dictionary();
        assert!(!dict.add("中国", "nz 1"));
        assert!(!dict.add_word("人民"));
        assert_eq!(dict.dynamic_len(), 0);
        assert!(dict.add_word("新词"));
        assert!(!dict.add_word("新词"));
    }

    #[test]
    fn test_bad_attribute() {
        let dict = dictionary();
        assert!(!dict.insert("新词", "nz"));
        assert!(!dict.insert("新词", "qq 1"));
        assert!(!dict.insert("新词", ""));
        assert!(!dict.add("新词", "nz x"));
        assert!(!dict.contains("新词"));
    }

    #[test]
    fn test_remove_dynamic_only() {
        let dict = dictionary();
        assert!(!dict.remove("中国"));
        assert!(dict.contains("中国"));
        dict.insert("新词", "nz 1");
        assert!(dict.remove("新词"));
        assert!(!dict.contains("新词"));
        assert!(!dict.remove("新词"));
    }

    #[test]
    fn test_parse_text_order() {
        let dict = dictionary();
        dict.insert("国人", "n 1");
        let mut hits = vec![];
        dict.parse_text("中国人民", |begin, end, _| hits.push((begin, end)));
        // Automaton hits come first, then the dynamic trie hits.
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[3], (1, 3));
        let mut automaton_hits = hits[..3].to_vec();
        automaton_hits.sort_unstable();
        assert_eq!(automaton_hits, vec![(0, 2), (0, 3), (2, 4)]);

        let sorted: Vec<(usize, usize)> = dict
            .parse_text_sorted("中国人民")
            .into_iter()
            .map(|h| (h.begin, h.end))
            .collect();
        assert_eq!(sorted, vec![(0, 2), (0, 3), (1, 3), (2, 4)]);
    }

    #[test]
    fn test_common_prefix_search() {
        let dict = CustomDictionary::empty();
        dict.insert("中", "n 1");
        dict.insert("中国", "ns 1");
        let found: Vec<String> = dict
            .common_prefix_search("中国人")
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        assert_eq!(found, vec!["中", "中国"]);
        assert!(dict.common_prefix_search("人").is_empty());

        let chars: Vec<char> = "我中国".chars().collect();
        assert_eq!(dict.common_prefix_search_at(&chars, 1).len(), 2);
        assert!(dict.common_prefix_search_at(&chars, 3).is_empty());
    }

    #[test]
    fn test_searcher() {
        let dict = CustomDictionary::empty();
        dict.insert("中国", "ns 1");
        dict.insert("国人", "n 1");
        let matches: Vec<(usize, String)> = dict
            .searcher("中国人")
            .map(|m| (m.begin, m.word))
            .collect();
        assert_eq!(matches, vec![(0, "中国".to_string()), (1, "国人".to_string())]);
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CustomDictionary>();
    }
}
