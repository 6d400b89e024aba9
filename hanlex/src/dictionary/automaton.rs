//! ダブル配列によるAho-Corasickオートマトン
//!
//! このモジュールは、単語集合全体から一度だけ構築される不変のオートマトンを提供します。
//! 完全一致検索と、テキスト全体を一度走査してすべての位置のすべての一致
//! (重なり合う一致や入れ子の一致を含む)を報告する多パターン検索に対応します。
//!
//! 状態遷移は`base`/`check`の二つの配列で表現され、失敗関数`fail`と
//! 各状態の出力(単語IDの集合)がこれに並行して保持されます。
//! 文字は構築時のキー集合のアルファベットを通して密なコードに変換されるため、
//! テーブルの大きさはUnicode全体ではなくコーパスの文字種に比例します。

mod builder;
mod posting;

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};

use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize};

use crate::dictionary::automaton::builder::TablesBuilder;
use crate::dictionary::automaton::posting::Postings;
use crate::errors::{HanlexError, Result};
use crate::utils::FromU32;

/// オートマトンの遷移表
///
/// 値の表は含みません。シリアライズされるのはこの構造体だけです。
#[derive(Archive, Serialize, Deserialize)]
pub(crate) struct Tables {
    alphabet: Vec<char>,
    base: Vec<i32>,
    check: Vec<i32>,
    fail: Vec<u32>,
    output: Vec<u32>,
    postings: Postings,
    lengths: Vec<u32>,
}

impl Tables {
    /// 読み込んだ遷移表が自己矛盾していないかを検査します。
    fn verify(&self, num_values: usize) -> Result<()> {
        let size = self.base.len();
        if size == 0
            || self.check.len() != size
            || self.fail.len() != size
            || self.output.len() != size
        {
            return Err(HanlexError::invalid_format(
                "automaton",
                "table lengths are inconsistent",
            ));
        }
        if self.lengths.len() != num_values {
            return Err(HanlexError::invalid_format(
                "automaton",
                format!(
                    "the automaton holds {} words, but {} values were given",
                    self.lengths.len(),
                    num_values
                ),
            ));
        }
        if self.alphabet.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HanlexError::invalid_format(
                "automaton",
                "the alphabet is not sorted",
            ));
        }
        if self.lengths.contains(&0) {
            return Err(HanlexError::invalid_format("automaton", "empty word"));
        }
        for i in 0..size {
            if usize::from_u32(self.fail[i]) >= size {
                return Err(HanlexError::invalid_format(
                    "automaton",
                    "failure link out of range",
                ));
            }
            if !self.postings.verify(usize::from_u32(self.output[i]), num_values) {
                return Err(HanlexError::invalid_format(
                    "automaton",
                    "output list out of range",
                ));
            }
            let b = self.base[i];
            if b < 0 && usize::try_from(-(i64::from(b) + 1))? >= num_values {
                return Err(HanlexError::invalid_format(
                    "automaton",
                    "terminal value out of range",
                ));
            }
        }
        Ok(())
    }

    #[inline(always)]
    fn code(&self, c: char) -> Option<i64> {
        self.alphabet
            .binary_search(&c)
            .ok()
            .map(|i| i as i64 + 1)
    }

    /// `base`値`b`からコード`code`で遷移した先の位置を返します。
    #[inline(always)]
    fn child(&self, b: i32, code: i64) -> Option<usize> {
        let p = usize::try_from(i64::from(b) + code).ok()?;
        (self.check.get(p) == Some(&b)).then_some(p)
    }

    /// 状態`state`から文字コード`code`を読んだ後の状態を返します。
    ///
    /// 遷移がなければ失敗関数をたどり、ルートでは遷移がなくてもルートに留まります。
    #[inline(always)]
    fn next_state(&self, mut state: usize, code: Option<i64>) -> usize {
        let Some(code) = code else {
            return 0;
        };
        loop {
            if let Some(p) = self.child(self.base[state], code) {
                return p;
            }
            if state == 0 {
                return 0;
            }
            state = usize::from_u32(self.fail[state]);
        }
    }

    fn exact_match<I>(&self, chars: I) -> Option<usize>
    where
        I: IntoIterator<Item = char>,
    {
        let mut b = self.base[0];
        let mut len = 0;
        for c in chars {
            let p = self.child(b, self.code(c)?)?;
            b = self.base[p];
            len += 1;
        }
        if len == 0 {
            return None;
        }
        let p = self.child(b, 0)?;
        let n = self.base[p];
        if n >= 0 {
            return None;
        }
        usize::try_from(-(i64::from(n) + 1)).ok()
    }
}

/// 一致結果
///
/// `begin`と`end`は文字単位のオフセットで、半開区間`begin..end`を表します。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hit<V> {
    /// 開始位置(文字単位)
    pub begin: usize,
    /// 終了位置(文字単位、この位置は含まない)
    pub end: usize,
    /// 一致した単語の値
    pub value: V,
}

/// ダブル配列Aho-Corasickオートマトン
///
/// 値`V`の表は構築に用いたキーの順序(ソート順)で保持され、
/// オートマトン内部の終端IDで添字付けされます。
pub struct DoubleArrayAutomaton<V> {
    tables: Tables,
    values: Vec<V>,
}

impl<V> DoubleArrayAutomaton<V> {
    /// 昇順に並んだ`(単語, 値)`の列からオートマトンを構築します。
    ///
    /// # 引数
    ///
    /// * `entries` - 単語の昇順に並んだエントリ。単語は空でなく、重複してはいけません。
    ///
    /// # エラー
    ///
    /// 単語が空、重複している、または昇順でない場合にエラーを返します。
    pub fn build<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        let (keys, values): (Vec<K>, Vec<V>) = entries.into_iter().unzip();
        let tables = TablesBuilder::build(&keys)?;
        Ok(Self { tables, values })
    }

    /// ソート済みマップからオートマトンを構築します。
    pub fn from_map(map: BTreeMap<String, V>) -> Result<Self> {
        Self::build(map)
    }

    /// 単語を一つも含まないオートマトンを作成します。
    pub fn empty() -> Self {
        Self::build(std::iter::empty::<(&str, V)>())
            .unwrap_or_else(|_| unreachable!("an empty key set is always valid"))
    }

    /// 収録されている単語数を返します。
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 単語が完全一致するかを調べ、一致した場合はその終端IDを返します。
    #[inline(always)]
    pub fn exact_match(&self, word: &str) -> Option<usize> {
        self.tables.exact_match(word.chars())
    }

    /// 文字スライスに対する [`exact_match`](Self::exact_match)。
    #[inline(always)]
    pub fn exact_match_chars(&self, word: &[char]) -> Option<usize> {
        self.tables.exact_match(word.iter().copied())
    }

    /// 単語の値を返します。
    pub fn get(&self, word: &str) -> Option<&V> {
        self.exact_match(word).and_then(|i| self.values.get(i))
    }

    /// 終端IDに対応する値を返します。
    #[inline(always)]
    pub fn value(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    /// 構築順(単語の昇順)に並んだ値の表を返します。
    #[inline(always)]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// テキスト全体を一度走査し、一致した単語ごとに`hit(begin, end, value)`を呼び出します。
    ///
    /// 一致は終了位置の昇順に報告されます。終了位置が同じ一致の順序は
    /// オートマトン内部の順序に従います。開始位置の順序は保証されません。
    pub fn scan<'a, F>(&'a self, text: &str, hit: F)
    where
        F: FnMut(usize, usize, &'a V),
    {
        self.scan_iter(text.chars(), hit);
    }

    /// 文字スライスに対する [`scan`](Self::scan)。
    pub fn scan_chars<'a, F>(&'a self, text: &[char], hit: F)
    where
        F: FnMut(usize, usize, &'a V),
    {
        self.scan_iter(text.iter().copied(), hit);
    }

    fn scan_iter<'a, I, F>(&'a self, chars: I, mut hit: F)
    where
        I: IntoIterator<Item = char>,
        F: FnMut(usize, usize, &'a V),
    {
        if self.is_empty() {
            return;
        }
        let mut state = 0;
        for (i, c) in chars.into_iter().enumerate() {
            state = self.tables.next_state(state, self.tables.code(c));
            let end = i + 1;
            for id in self.tables.postings.ids(usize::from_u32(self.tables.output[state])) {
                let id = usize::from_u32(id);
                hit(end - usize::from_u32(self.tables.lengths[id]), end, &self.values[id]);
            }
        }
    }

    /// [`scan`](Self::scan)の結果をベクタとして返します。
    pub fn matches(&self, text: &str) -> Vec<Hit<&V>> {
        let mut hits = vec![];
        self.scan(text, |begin, end, value| hits.push(Hit { begin, end, value }));
        hits
    }

    /// 遷移表を書き出します。値の表は書き出されません。
    ///
    /// 形式は、ビッグエンディアンの`u32`によるバイト長と、それに続く
    /// `rkyv`でシリアライズされた遷移表です。
    ///
    /// # エラー
    ///
    /// 書き込みまたはシリアライズに失敗した場合にエラーを返します。
    pub fn save<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&self.tables)?;
        let len = u32::try_from(bytes.len())?;
        wtr.write_all(&len.to_be_bytes())?;
        wtr.write_all(&bytes)?;
        Ok(())
    }

    /// [`save`](Self::save)で書き出した遷移表を読み込み、外部から与えられた値の表と組み合わせます。
    ///
    /// # 引数
    ///
    /// * `rdr` - 遷移表を読み込むリーダー
    /// * `values` - 構築順に並んだ値の表
    ///
    /// # エラー
    ///
    /// 読み込みに失敗した場合、データが壊れている場合、または
    /// 収録単語数と`values`の長さが一致しない場合にエラーを返します。
    pub fn load<R>(mut rdr: R, values: Vec<V>) -> Result<Self>
    where
        R: Read,
    {
        let mut len = [0; 4];
        rdr.read_exact(&mut len)?;
        let len = usize::from_u32(u32::from_be_bytes(len));

        let mut buffer = Vec::new();
        rdr.take(u64::try_from(len)?).read_to_end(&mut buffer)?;
        if buffer.len() != len {
            return Err(HanlexError::invalid_format(
                "automaton",
                format!("expected {len} bytes of tables, but found {}", buffer.len()),
            ));
        }

        let mut aligned_bytes = AlignedVec::<16>::with_capacity(len);
        aligned_bytes.extend_from_slice(&buffer);
        let tables = rkyv::from_bytes::<Tables, rkyv::rancor::Error>(&aligned_bytes)?;
        tables.verify(values.len())?;

        Ok(Self { tables, values })
    }
}

impl<V> fmt::Debug for DoubleArrayAutomaton<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DoubleArrayAutomaton")
            .field("size", &self.size())
            .field("alphabet", &self.tables.alphabet.len())
            .field("states", &self.tables.base.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(words: &[&str]) -> DoubleArrayAutomaton<usize> {
        let mut sorted = words.to_vec();
        sorted.sort_unstable();
        DoubleArrayAutomaton::build(sorted.into_iter().enumerate().map(|(i, w)| (w, i))).unwrap()
    }

    fn spans(automaton: &DoubleArrayAutomaton<usize>, text: &str) -> Vec<(usize, usize)> {
        let mut spans: Vec<_> = automaton
            .matches(text)
            .into_iter()
            .map(|h| (h.begin, h.end))
            .collect();
        spans.sort_unstable();
        spans
    }

    #[test]
    fn test_exact_match() {
        let automaton = build(&["中国", "中国人", "国人", "人民"]);
        assert_eq!(automaton.size(), 4);
        assert_eq!(automaton.exact_match("中国"), Some(0));
        assert_eq!(automaton.exact_match("中国人"), Some(1));
        assert_eq!(automaton.exact_match("人民"), Some(2));
        assert_eq!(automaton.exact_match("国人"), Some(3));
        assert_eq!(automaton.exact_match("中"), None);
        assert_eq!(automaton.exact_match("中国人民"), None);
        assert_eq!(automaton.exact_match("日本"), None);
        assert_eq!(automaton.exact_match(""), None);
        assert_eq!(automaton.get("国人"), Some(&3));
    }

    #[test]
    fn test_scan_overlapping() {
        let automaton = build(&["中国", "中国人", "国人", "人民"]);
        assert_eq!(
            spans(&automaton, "中国人民"),
            vec![(0, 2), (0, 3), (1, 3), (2, 4)],
        );
    }

    #[test]
    fn test_scan_order_by_end() {
        let automaton = build(&["ab", "b", "bc", "c"]);
        let ends: Vec<usize> = automaton.matches("abc").iter().map(|h| h.end).collect();
        assert!(ends.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ends.len(), 4);
    }

    #[test]
    fn test_scan_keeps_value_refs() {
        let automaton = build(&["中国", "中国人", "人民"]);
        let mut values: Vec<&usize> = vec![];
        automaton.scan("中国人民", |_, _, value| values.push(value));
        values.sort_unstable();
        assert_eq!(values, vec![&0, &1, &2]);

        let hits = automaton.matches("人民");
        assert_eq!(hits, vec![Hit { begin: 0, end: 2, value: &2 }]);
    }

    #[test]
    fn test_scan_repeated() {
        let automaton = build(&["aa"]);
        assert_eq!(spans(&automaton, "aaaa"), vec![(0, 2), (1, 3), (2, 4)]);
    }

    #[test]
    fn test_scan_failure_links() {
        let automaton = build(&["he", "she", "his", "hers"]);
        assert_eq!(
            spans(&automaton, "ushers"),
            vec![(1, 4), (2, 4), (2, 6)],
        );
    }

    #[test]
    fn test_scan_outside_alphabet() {
        let automaton = build(&["裸婚"]);
        assert!(automaton.matches("hello, world").is_empty());
        assert_eq!(spans(&automaton, "x裸婚y裸婚"), vec![(1, 3), (4, 6)]);
    }

    #[test]
    fn test_scan_supplementary_chars() {
        let automaton = build(&["𠀀𠀁", "😀"]);
        assert_eq!(spans(&automaton, "a𠀀𠀁😀"), vec![(1, 3), (3, 4)]);
    }

    #[test]
    fn test_empty_automaton() {
        let automaton = DoubleArrayAutomaton::<usize>::empty();
        assert_eq!(automaton.size(), 0);
        assert_eq!(automaton.exact_match("a"), None);
        assert!(automaton.matches("anything").is_empty());
    }

    #[test]
    fn test_save_load() {
        let automaton = build(&["中国", "中国人", "国人", "人民"]);
        let mut buf = vec![];
        automaton.save(&mut buf).unwrap();

        let loaded = DoubleArrayAutomaton::load(buf.as_slice(), automaton.values().to_vec()).unwrap();
        for word in ["中国", "中国人", "国人", "人民", "中", "民"] {
            assert_eq!(loaded.exact_match(word), automaton.exact_match(word));
        }
        assert_eq!(spans(&loaded, "中国人民"), spans(&automaton, "中国人民"));
    }

    #[test]
    fn test_load_size_mismatch() {
        let automaton = build(&["中国", "人民"]);
        let mut buf = vec![];
        automaton.save(&mut buf).unwrap();
        assert!(DoubleArrayAutomaton::load(buf.as_slice(), vec![0usize]).is_err());
    }

    #[test]
    fn test_load_truncated() {
        let automaton = build(&["中国", "人民"]);
        let mut buf = vec![];
        automaton.save(&mut buf).unwrap();
        buf.truncate(buf.len() - 1);
        assert!(DoubleArrayAutomaton::load(buf.as_slice(), vec![0usize, 1]).is_err());
    }
}
