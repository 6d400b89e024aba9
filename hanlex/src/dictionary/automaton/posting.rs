//! ポスティングリスト
//!
//! このモジュールは、各状態で出力される単語IDの集合を管理します。

use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::Result;
use crate::utils::FromU32;

/// ポスティングリスト
///
/// オフセット0には常に空のリストが置かれます。
#[derive(Archive, Serialize, Deserialize)]
pub struct Postings {
    // Sets of ids are stored by interleaving their length and values.
    data: Vec<u32>,
}

impl Postings {
    /// 指定されたオフセットのIDイテレータを取得します。
    #[inline(always)]
    pub fn ids(&'_ self, i: usize) -> impl Iterator<Item = u32> + '_ {
        let len = usize::from_u32(self.data[i]);
        self.data[i + 1..i + 1 + len].iter().cloned()
    }

    /// オフセット`i`が有効なリストを指し、含まれるIDがすべて`num_ids`未満であるかを検査します。
    pub fn verify(&self, i: usize, num_ids: usize) -> bool {
        let Some(&len) = self.data.get(i) else {
            return false;
        };
        let end = i + 1 + usize::from_u32(len);
        self.data
            .get(i + 1..end)
            .is_some_and(|ids| ids.iter().all(|&id| usize::from_u32(id) < num_ids))
    }
}

/// ポスティングリストを構築するビルダー
pub struct PostingsBuilder {
    data: Vec<u32>,
}

impl Default for PostingsBuilder {
    fn default() -> Self {
        Self { data: vec![0] }
    }
}

impl PostingsBuilder {
    /// 新しいビルダーを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// IDリストを追加し、そのオフセットを返します。
    #[inline(always)]
    pub fn push(&mut self, ids: &[u32]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let offset = self.data.len();
        self.data.push(ids.len().try_into()?);
        self.data.extend_from_slice(ids);
        Ok(offset)
    }

    /// ポスティングリストを構築します。
    #[allow(clippy::missing_const_for_fn)]
    pub fn build(self) -> Postings {
        Postings { data: self.data }
    }
}
