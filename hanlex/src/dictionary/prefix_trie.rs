//! 動的な接頭辞トライ
//!
//! 実行時に単語を追加・削除できる、文字をキーとするトライです。
//! 各ノードの子は文字をキーとするソート済みマップで保持するため、
//! Unicode全体のような疎で大きなアルファベットでも子の探索は O(log σ) で済みます。

use std::collections::BTreeMap;

/// トライのノード
///
/// `value`はこのノードで単語が終わる場合にのみ存在します。
struct Node<V> {
    value: Option<V>,
    children: BTreeMap<char, Node<V>>,
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Self {
            value: None,
            children: BTreeMap::new(),
        }
    }
}

/// 接頭辞トライ
pub struct PrefixTrie<V> {
    root: Node<V>,
    len: usize,
}

impl<V> Default for PrefixTrie<V> {
    fn default() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }
}

impl<V> PrefixTrie<V> {
    /// 空のトライを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 収録されている単語数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 単語を追加します。
    ///
    /// # 引数
    ///
    /// * `word` - 追加する単語。空文字列は追加できません。
    /// * `value` - 単語の値
    /// * `overwrite` - `false`の場合、既に存在する単語は置き換えません。
    ///
    /// # 戻り値
    ///
    /// 値を格納した場合は`true`。空文字列の場合と、`overwrite`が`false`で
    /// 単語が既に存在する場合は`false`。
    pub fn insert(&mut self, word: &str, value: V, overwrite: bool) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        if node.value.is_some() && !overwrite {
            return false;
        }
        if node.value.replace(value).is_none() {
            self.len += 1;
        }
        true
    }

    /// 単語を削除し、その値を返します。
    ///
    /// 削除によって子も値も持たなくなった祖先ノードは取り除かれます。
    pub fn remove(&mut self, word: &str) -> Option<V> {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return None;
        }
        let removed = Self::remove_from(&mut self.root, &chars);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn remove_from(node: &mut Node<V>, chars: &[char]) -> Option<V> {
        let Some((c, rest)) = chars.split_first() else {
            return node.value.take();
        };
        let child = node.children.get_mut(c)?;
        let removed = Self::remove_from(child, rest);
        if removed.is_some() && child.value.is_none() && child.children.is_empty() {
            node.children.remove(c);
        }
        removed
    }

    fn find(&self, word: &str) -> Option<&Node<V>> {
        let mut node = &self.root;
        for c in word.chars() {
            node = node.children.get(&c)?;
        }
        Some(node)
    }

    /// 単語の値を返します。
    pub fn get(&self, word: &str) -> Option<&V> {
        self.find(word).and_then(|node| node.value.as_ref())
    }

    /// 単語が収録されているかを返します。
    pub fn contains_key(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    /// `text[begin..]`の接頭辞になっている単語をすべて、短い順に返します。
    ///
    /// 一致する単語がない場合や`begin`がテキストの末尾以降の場合は空のベクタを返します。
    pub fn common_prefix_search(&self, text: &[char], begin: usize) -> Vec<(String, &V)> {
        let mut results = vec![];
        let Some(suffix) = text.get(begin..) else {
            return results;
        };
        let mut node = &self.root;
        let mut word = String::new();
        for &c in suffix {
            let Some(child) = node.children.get(&c) else {
                break;
            };
            word.push(c);
            if let Some(value) = child.value.as_ref() {
                results.push((word.clone(), value));
            }
            node = child;
        }
        results
    }

    /// すべての`(単語, 値)`を単語の昇順で返します。
    pub fn iter(&self) -> impl Iterator<Item = (String, &V)> + '_ {
        let mut entries = Vec::with_capacity(self.len);
        Self::collect(&self.root, &mut String::new(), &mut entries);
        entries.into_iter()
    }

    fn collect<'a>(node: &'a Node<V>, prefix: &mut String, entries: &mut Vec<(String, &'a V)>) {
        if let Some(value) = node.value.as_ref() {
            entries.push((prefix.clone(), value));
        }
        for (&c, child) in &node.children {
            prefix.push(c);
            Self::collect(child, prefix, entries);
            prefix.pop();
        }
    }
}
