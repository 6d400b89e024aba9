//! キャッシュ検証モジュール
//!
//! キャッシュファイルを読み込んで検証し、収録単語数と品詞ごとの統計を表示します。

use std::collections::BTreeMap;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use hanlex::dictionary::cache;
use hanlex::errors::HanlexError;
use hanlex::Nature;

use clap::Parser;

/// 検証コマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "inspect", about = "A program to verify a dictionary cache and print its statistics.")]
pub struct Args {
    /// Cache file to inspect.
    #[clap(short = 'i', long)]
    cache_in: PathBuf,

    /// Prints the number of words and the total frequency for each part-of-speech tag.
    #[clap(long)]
    natures: bool,
}

/// 検証処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// キャッシュの読み込みエラー
    #[error("Invalid cache: {0}")]
    Hanlex(#[from] HanlexError),
}

pub fn run(args: Args) -> Result<(), InspectError> {
    let automaton = cache::read_cache(&args.cache_in)?;

    let out = io::stdout();
    let mut out = BufWriter::new(out.lock());
    let total: u64 = automaton
        .values()
        .iter()
        .map(|attr| u64::from(attr.total_frequency()))
        .sum();
    writeln!(out, "words\t{}", automaton.size())?;
    writeln!(out, "total_frequency\t{total}")?;

    if args.natures {
        let mut stats: BTreeMap<Nature, (usize, u64)> = BTreeMap::new();
        for attr in automaton.values() {
            for (nature, frequency) in attr.iter() {
                let entry = stats.entry(nature).or_default();
                entry.0 += 1;
                entry.1 += u64::from(frequency);
            }
        }
        for (nature, (num_words, frequency)) in stats {
            writeln!(out, "{nature}\t{num_words}\t{frequency}")?;
        }
    }
    out.flush()?;
    Ok(())
}
