//! 辞書ソースの設定
//!
//! 辞書ソースは`"path/to/dict.txt nz"`のように、パスと省略可能な既定品詞で指定します。
//! 複数のソースは`;`で区切って並べることができ、最初のソースが一次ソースになります。
//! 空白で始まるエントリは、直前のエントリと同じディレクトリからの相対パスとして解決されます。
//!
//! ```
//! use hanlex::dictionary::DictionaryConfig;
//! use hanlex::Nature;
//!
//! let config: DictionaryConfig = "dict/custom.txt; places.txt ns".parse().unwrap();
//! assert_eq!(config.sources()[1].path(), std::path::Path::new("dict/places.txt"));
//! assert_eq!(config.sources()[1].default_nature(), Nature::Ns);
//! assert_eq!(config.cache_path(), std::path::Path::new("dict/custom.txt.bin"));
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::dictionary::cache::CACHE_EXT;
use crate::errors::{HanlexError, Result};
use crate::nature::Nature;

/// 既定品詞が指定されていないソースで使われる品詞
pub const DEFAULT_NATURE: Nature = Nature::N;

/// 辞書ソース
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictionarySource {
    path: PathBuf,
    default_nature: Nature,
}

impl DictionarySource {
    /// 新しい辞書ソースを作成します。
    pub fn new<P>(path: P, default_nature: Nature) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            path: path.into(),
            default_nature,
        }
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 品詞欄のない行に使われる品詞
    #[inline(always)]
    pub const fn default_nature(&self) -> Nature {
        self.default_nature
    }
}

/// `"path [tag]"`をパスと品詞名に分けます。品詞名がない場合は空文字列です。
fn split_entry(s: &str) -> (&str, &str) {
    match s.split_once(' ') {
        Some((path, tag)) => (path, tag.trim()),
        None => (s, ""),
    }
}

fn parse_nature(tag: &str) -> Result<Nature> {
    if tag.is_empty() {
        Ok(DEFAULT_NATURE)
    } else {
        tag.parse()
    }
}

impl FromStr for DictionarySource {
    type Err = HanlexError;

    /// `"path [tag]"`をパースします。最初の空白より後ろが既定品詞です。
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim_end();
        let (path, tag) = split_entry(s);
        if path.is_empty() {
            return Err(HanlexError::invalid_argument(
                "source",
                format!("no path in {s:?}"),
            ));
        }
        Ok(Self::new(path, parse_nature(tag)?))
    }
}

/// 辞書の設定
///
/// 読み込む [`DictionarySource`] の列と、キャッシュの位置を決める一次ソースのパスからなります。
/// 一次ソースの既定品詞が不正でそのソースが読み飛ばされた場合も、キャッシュのパスは一次ソースから決まります。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictionaryConfig {
    primary_path: PathBuf,
    sources: Vec<DictionarySource>,
}

impl DictionaryConfig {
    /// ソースの列から設定を作成します。先頭のソースが一次ソースです。
    ///
    /// # エラー
    ///
    /// `sources`が空の場合にエラーを返します。
    pub fn new(sources: Vec<DictionarySource>) -> Result<Self> {
        let Some(primary) = sources.first() else {
            return Err(HanlexError::invalid_argument(
                "sources",
                "at least one dictionary source is required",
            ));
        };
        Ok(Self {
            primary_path: primary.path().to_path_buf(),
            sources,
        })
    }

    /// 読み込むソースの列
    #[inline(always)]
    pub fn sources(&self) -> &[DictionarySource] {
        &self.sources
    }

    /// 一次ソースのパス
    #[inline(always)]
    pub fn primary_path(&self) -> &Path {
        &self.primary_path
    }

    /// キャッシュファイルのパス。一次ソースのパスに [`CACHE_EXT`] を付加したものです。
    pub fn cache_path(&self) -> PathBuf {
        let mut path = OsString::from(self.primary_path.as_os_str());
        path.push(CACHE_EXT);
        PathBuf::from(path)
    }
}

impl FromStr for DictionaryConfig {
    type Err = HanlexError;

    /// `;`で区切られたソースの列をパースします。
    ///
    /// 既定品詞が不正なソースは、エラーログに記録して読み飛ばします。
    /// 一次ソースを読み飛ばした場合も、そのパスはキャッシュの位置として使われます。
    ///
    /// # エラー
    ///
    /// ソースが一つも書かれていない場合にエラーを返します。
    fn from_str(s: &str) -> Result<Self> {
        let mut primary_path: Option<PathBuf> = None;
        let mut sources = vec![];
        let mut prev_dir: Option<PathBuf> = None;
        for entry in s.split(';') {
            if entry.trim().is_empty() {
                continue;
            }
            let (path, tag) = split_entry(entry.trim());
            let mut path = PathBuf::from(path);
            if entry.starts_with(' ')
                && let Some(dir) = &prev_dir
            {
                path = dir.join(path);
            }
            prev_dir = path.parent().map(Path::to_path_buf);
            if primary_path.is_none() {
                primary_path = Some(path.clone());
            }
            match parse_nature(tag) {
                Ok(default_nature) => sources.push(DictionarySource::new(path, default_nature)),
                Err(e) => {
                    log::error!("[hanlex] Skipped dictionary source {}: {e}", path.display());
                }
            }
        }
        let Some(primary_path) = primary_path else {
            return Err(HanlexError::invalid_argument(
                "config",
                "at least one dictionary source is required",
            ));
        };
        Ok(Self {
            primary_path,
            sources,
        })
    }
}
