//! カスタム辞書で全一致走査を行うユーティリティ
//!
//! このバイナリは、標準入力から読み込んだテキストの各行について、
//! カスタム辞書に一致するすべての単語を指定された出力形式（hits、surface）で出力します。

use std::error::Error;
use std::io::{BufRead, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::str::FromStr;

use hanlex::dictionary::{BaseDictionary, DictionaryConfig, DictionarySource, NoBase, WordSet};
use hanlex::{CustomDictionary, Hit};

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// 出力モード
#[derive(Clone, Debug)]
enum OutputMode {
    Hits,
    Surface,
}

/// `OutputMode` の `FromStr` 実装
impl FromStr for OutputMode {
    type Err = &'static str;

    /// 文字列から出力モードをパースする
    ///
    /// # 引数
    ///
    /// * `mode` - パース対象の文字列（"hits"、"surface"のいずれか）
    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "hits" => Ok(Self::Hits),
            "surface" => Ok(Self::Surface),
            _ => Err("Could not parse a mode"),
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "scan", about = "Finds every custom dictionary word in each input line")]
struct Args {
    /// Dictionary source in the form of "path [tag]". Repeat to merge several sources.
    ///
    /// The cache next to the first source is used when it is valid.
    #[clap(short = 's', long = "source", required = true)]
    sources: Vec<DictionarySource>,

    /// Word list of the base dictionary.
    #[clap(short = 'b', long)]
    base_in: Option<PathBuf>,

    /// Output mode. Choices are hits and surface.
    #[clap(short = 'O', long, default_value = "hits")]
    output_mode: OutputMode,

    /// Sorts the hits of each line by their positions.
    #[clap(short = 'S', long)]
    sort: bool,
}

/// メイン関数
///
/// 辞書をロードし、標準入力から読み込んだ各行を走査して、
/// 一致した単語を指定された形式で標準出力に出力します。
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    eprintln!("Loading the dictionary...");
    let config = DictionaryConfig::new(args.sources)?;
    let base: Box<dyn BaseDictionary> = match &args.base_in {
        Some(path) => Box::new(WordSet::from_path(path)?),
        None => Box::new(NoBase),
    };
    let dict = CustomDictionary::load(&config, &*base)?;

    eprintln!("Ready to scan {} words", dict.size());

    let is_tty = std::io::stdout().is_terminal();

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    let lines = std::io::stdin().lock().lines();
    for line in lines {
        let line = line?;
        let chars: Vec<char> = line.chars().collect();
        let hits = if args.sort {
            dict.parse_text_sorted(&line)
        } else {
            let mut hits = vec![];
            dict.parse_text(&line, |begin, end, attr| {
                hits.push(Hit {
                    begin,
                    end,
                    value: attr.clone(),
                });
            });
            hits
        };
        match args.output_mode {
            OutputMode::Hits => {
                for hit in &hits {
                    let surface: String = chars[hit.begin..hit.end].iter().collect();
                    writeln!(&mut out, "{}\t{}\t{}\t{}", hit.begin, hit.end, surface, hit.value)?;
                }
                out.write_all(b"EOS\n")?;
            }
            OutputMode::Surface => {
                for (i, hit) in hits.iter().enumerate() {
                    if i != 0 {
                        out.write_all(b" ")?;
                    }
                    let surface: String = chars[hit.begin..hit.end].iter().collect();
                    out.write_all(surface.as_bytes())?;
                }
                out.write_all(b"\n")?;
            }
        }
        if is_tty {
            out.flush()?;
        }
    }

    Ok(())
}
