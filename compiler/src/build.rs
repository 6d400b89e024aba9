//! キャッシュ構築モジュール
//!
//! 辞書ソースを統合してオートマトンを構築し、バイナリキャッシュを書き出します。

use std::path::PathBuf;
use std::time::Instant;

use hanlex::dictionary::{cache, loader};
use hanlex::dictionary::{DictionaryConfig, DictionarySource, NoBase, WordSet};
use hanlex::errors::HanlexError;
use hanlex::DoubleArrayAutomaton;

use clap::Parser;

/// ビルドコマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "build",
    about = "A program to build the binary cache of a custom dictionary."
)]
pub struct Args {
    /// Dictionary source in the form of "path [tag]".
    ///
    /// Repeat this option to merge several sources. The first one is the primary source;
    /// words in later sources that are already merged are skipped.
    #[clap(short = 's', long = "source", required = true)]
    sources: Vec<DictionarySource>,

    /// Word list of the base dictionary. Its words are excluded from the custom dictionary.
    #[clap(short = 'b', long)]
    base_in: Option<PathBuf>,

    /// File to which the cache is output.
    ///
    /// Defaults to the primary source path with the `.bin` extension appended.
    #[clap(short = 'o', long)]
    cache_out: Option<PathBuf>,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 辞書構築エラー
    #[error("Dictionary building failed: {0}")]
    Hanlex(#[from] HanlexError),
}

/// ビルド処理を実行する
///
/// # 引数
///
/// * `args` - コマンドライン引数
///
/// # エラー
///
/// 一次ソースの読み込み、オートマトンの構築、またはキャッシュの書き出しに失敗した場合にエラーを返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    let config = DictionaryConfig::new(args.sources)?;

    let map = match &args.base_in {
        Some(path) => {
            log::info!("Reading the base dictionary {}...", path.display());
            let base = WordSet::from_path(path)?;
            log::info!("{} base words", base.len());
            loader::load_all(config.sources(), &base)?
        }
        None => loader::load_all(config.sources(), &NoBase)?,
    };

    log::info!("Building the automaton of {} words...", map.len());
    let start = Instant::now();
    let automaton = DoubleArrayAutomaton::from_map(map)?;
    log::info!("{:?} built in {} ms", automaton, start.elapsed().as_millis());

    let cache_out = args.cache_out.unwrap_or_else(|| config.cache_path());
    log::info!("Writing the cache to {}...", cache_out.display());
    cache::write_cache(&cache_out, &automaton)?;

    log::info!("Done");
    Ok(())
}
