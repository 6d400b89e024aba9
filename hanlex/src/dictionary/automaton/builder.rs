//! ダブル配列オートマトンの構築
//!
//! ソート済みのキー集合から、まず goto 関数のトライを作り、それをダブル配列に
//! 配置したあとで失敗関数と出力関数を計算します。

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::dictionary::automaton::posting::PostingsBuilder;
use crate::dictionary::automaton::Tables;
use crate::errors::{HanlexError, Result};

const INITIAL_CAPACITY: usize = 1 << 12;

/// 空き領域を探す際、ここまで埋まった区間は以後の探索対象から外します。
const DENSITY_THRESHOLD: f64 = 0.95;

/// goto トライの状態
#[derive(Default)]
struct State {
    success: BTreeMap<usize, usize>,
    key_id: Option<u32>,
    failure: usize,
    emits: Vec<u32>,
    index: usize,
}

/// 兄弟ノード。`code == 0`は親で終わるキーを表す終端ノードです。
struct Sibling {
    code: usize,
    target: Target,
}

enum Target {
    Terminal(u32),
    State(usize),
}

/// キー集合からダブル配列の各テーブルを構築するビルダー
pub(crate) struct TablesBuilder {
    alphabet: Vec<char>,
    states: Vec<State>,
    lengths: Vec<u32>,
    base: Vec<i64>,
    check: Vec<i64>,
    used: Vec<bool>,
    next_check_pos: usize,
    size: usize,
}

impl TablesBuilder {
    /// 昇順かつ重複のない空でないキーの列からテーブルを構築します。
    ///
    /// # エラー
    ///
    /// キーが空文字列の場合、昇順でない場合、または重複している場合にエラーを返します。
    pub fn build<K>(keys: &[K]) -> Result<Tables>
    where
        K: AsRef<str>,
    {
        for (i, key) in keys.iter().enumerate() {
            let key = key.as_ref();
            if key.is_empty() {
                return Err(HanlexError::invalid_argument(
                    "keys",
                    format!("the key at {i} is empty"),
                ));
            }
            if i != 0 && keys[i - 1].as_ref() >= key {
                return Err(HanlexError::invalid_argument(
                    "keys",
                    format!("keys must be sorted and unique, but {key:?} follows {:?}", keys[i - 1].as_ref()),
                ));
            }
        }

        let alphabet: Vec<char> = keys
            .iter()
            .flat_map(|k| k.as_ref().chars())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut builder = Self {
            alphabet,
            states: vec![State::default()],
            lengths: Vec::with_capacity(keys.len()),
            base: vec![0; INITIAL_CAPACITY],
            check: vec![0; INITIAL_CAPACITY],
            used: vec![false; INITIAL_CAPACITY],
            next_check_pos: 0,
            size: 1,
        };
        for (i, key) in keys.iter().enumerate() {
            builder.add_key(key.as_ref(), u32::try_from(i)?);
        }
        builder.arrange()?;
        builder.build_failures();
        builder.finish()
    }

    #[inline(always)]
    fn code(&self, c: char) -> usize {
        // Every character of the keys is in the alphabet.
        self.alphabet.binary_search(&c).map_or(0, |i| i + 1)
    }

    fn add_key(&mut self, key: &str, key_id: u32) {
        let mut state = 0;
        let mut len = 0u32;
        for c in key.chars() {
            let code = self.code(c);
            state = match self.states[state].success.get(&code) {
                Some(&next) => next,
                None => {
                    let next = self.states.len();
                    self.states.push(State::default());
                    self.states[state].success.insert(code, next);
                    next
                }
            };
            len += 1;
        }
        self.states[state].key_id = Some(key_id);
        self.states[state].emits.push(key_id);
        self.lengths.push(len);
    }

    fn fetch(&self, state: usize) -> Vec<Sibling> {
        let s = &self.states[state];
        let mut siblings = Vec::with_capacity(s.success.len() + 1);
        if let Some(key_id) = s.key_id {
            siblings.push(Sibling {
                code: 0,
                target: Target::Terminal(key_id),
            });
        }
        for (&code, &child) in &s.success {
            siblings.push(Sibling {
                code,
                target: Target::State(child),
            });
        }
        siblings
    }

    fn reserve(&mut self, len: usize) {
        if self.base.len() < len {
            let new_len = len.max(self.base.len() * 2);
            self.base.resize(new_len, 0);
            self.check.resize(new_len, 0);
            self.used.resize(new_len, false);
        }
    }

    /// 兄弟ノード全体を配置できる開始位置を探します。
    fn find_begin(&mut self, siblings: &[Sibling]) -> usize {
        let first_code = siblings[0].code;
        let last_code = siblings[siblings.len() - 1].code;

        let mut pos = (first_code + 1).max(self.next_check_pos) - 1;
        let mut nonzero_num = 0usize;
        let mut first = true;
        let begin = loop {
            pos += 1;
            self.reserve(pos + 1);
            if self.check[pos] != 0 {
                nonzero_num += 1;
                continue;
            } else if first {
                self.next_check_pos = pos;
                first = false;
            }
            let begin = pos - first_code;
            self.reserve(begin + last_code + 1);
            if self.used[begin] {
                continue;
            }
            if siblings[1..].iter().all(|s| self.check[begin + s.code] == 0) {
                break begin;
            }
        };

        if nonzero_num as f64 / (pos - self.next_check_pos + 1) as f64 >= DENSITY_THRESHOLD {
            self.next_check_pos = pos;
        }
        begin
    }

    /// goto トライをダブル配列に配置します。
    fn arrange(&mut self) -> Result<()> {
        let root_siblings = self.fetch(0);
        if root_siblings.is_empty() {
            return Ok(());
        }
        let mut queue = VecDeque::from([(0usize, root_siblings)]);
        while let Some((parent, siblings)) = queue.pop_front() {
            let begin = self.find_begin(&siblings);
            self.used[begin] = true;
            self.size = self.size.max(begin + siblings[siblings.len() - 1].code + 1);
            let begin_i = i64::try_from(begin)?;
            for s in &siblings {
                self.check[begin + s.code] = begin_i;
            }
            for s in siblings {
                let pos = begin + s.code;
                match s.target {
                    Target::Terminal(key_id) => {
                        self.base[pos] = -i64::from(key_id) - 1;
                    }
                    Target::State(child) => {
                        self.states[child].index = pos;
                        queue.push_back((pos, self.fetch(child)));
                    }
                }
            }
            self.base[parent] = begin_i;
        }
        Ok(())
    }

    /// 幅優先で失敗関数を求め、出力を失敗先から引き継ぎます。
    fn build_failures(&mut self) {
        let mut queue = VecDeque::new();
        let root_children: Vec<usize> = self.states[0].success.values().copied().collect();
        for child in root_children {
            self.states[child].failure = 0;
            queue.push_back(child);
        }
        while let Some(state) = queue.pop_front() {
            let children: Vec<(usize, usize)> = self.states[state]
                .success
                .iter()
                .map(|(&code, &child)| (code, child))
                .collect();
            for (code, child) in children {
                queue.push_back(child);
                let mut trace = self.states[state].failure;
                let failure = loop {
                    if let Some(&next) = self.states[trace].success.get(&code) {
                        break next;
                    }
                    if trace == 0 {
                        break 0;
                    }
                    trace = self.states[trace].failure;
                };
                self.states[child].failure = failure;
                let inherited = self.states[failure].emits.clone();
                self.states[child].emits.extend(inherited);
            }
        }
    }

    fn finish(self) -> Result<Tables> {
        let size = self.size;
        let base = self.base[..size]
            .iter()
            .map(|&b| i32::try_from(b))
            .collect::<Result<Vec<_>, _>>()?;
        let check = self.check[..size]
            .iter()
            .map(|&c| i32::try_from(c))
            .collect::<Result<Vec<_>, _>>()?;

        let mut fail = vec![0u32; size];
        let mut output = vec![0u32; size];
        let mut postings = PostingsBuilder::new();
        for state in &self.states[1..] {
            fail[state.index] = u32::try_from(self.states[state.failure].index)?;
            if state.emits.is_empty() {
                continue;
            }
            let mut emits = state.emits.clone();
            emits.sort_unstable_by(|a, b| b.cmp(a));
            emits.dedup();
            output[state.index] = u32::try_from(postings.push(&emits)?)?;
        }

        Ok(Tables {
            alphabet: self.alphabet,
            base,
            check,
            fail,
            output,
            postings: postings.build(),
            lengths: self.lengths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsorted() {
        assert!(TablesBuilder::build(&["b", "a"]).is_err());
    }

    #[test]
    fn test_rejects_duplicate() {
        assert!(TablesBuilder::build(&["a", "a"]).is_err());
    }

    #[test]
    fn test_rejects_empty_key() {
        assert!(TablesBuilder::build(&["", "a"]).is_err());
    }

    #[test]
    fn test_empty_key_set() {
        let keys: [&str; 0] = [];
        let tables = TablesBuilder::build(&keys).unwrap();
        assert_eq!(tables.base.len(), 1);
        assert!(tables.lengths.is_empty());
    }
}
