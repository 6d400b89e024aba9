//! 辞書ソースの読み込みとオートマトンの構築
//!
//! 複数のソースを一つのソート済みマップにまとめ、オートマトンを構築してキャッシュに書き出します。
//! 次回以降はキャッシュを優先して読み込みます。

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::attribute::Attribute;
use crate::dictionary::automaton::DoubleArrayAutomaton;
use crate::dictionary::base::BaseDictionary;
use crate::dictionary::cache;
use crate::dictionary::config::{DictionaryConfig, DictionarySource};
use crate::errors::{HanlexError, Result};
use crate::nature::Nature;

/// `word [tag freq]*`形式の辞書ソースを読み込みます。
///
/// 空行は無視されます。品詞欄のない行は`(default_nature, 1)`の属性になります。
/// 同じ単語が複数回現れる場合も、すべての行をそのまま返します。
///
/// # エラー
///
/// 読み込みに失敗した場合、UTF-8として不正な行がある場合、
/// または品詞や頻度が不正な行がある場合にエラーを返します。
pub fn read_source<R>(rdr: R, default_nature: Nature) -> Result<Vec<(String, Attribute)>>
where
    R: BufRead,
{
    let mut entries = vec![];
    for (i, line) in rdr.split(b'\n').enumerate() {
        let line = line?;
        let mut line = std::str::from_utf8(&line)?;
        if i == 0 {
            line = line.trim_start_matches('\u{feff}');
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some((word, rest)) = fields.split_first() else {
            continue;
        };
        let attr = Attribute::from_record_fields(rest, default_nature).map_err(|e| {
            HanlexError::invalid_format("source", format!("line {}: {e}", i + 1))
        })?;
        entries.push(((*word).to_string(), attr));
    }
    Ok(entries)
}

fn read_source_file(source: &DictionarySource) -> Result<Vec<(String, Attribute)>> {
    let file = File::open(source.path())?;
    read_source(BufReader::new(file), source.default_nature())
}

/// 全ソースを読み込み、一つのソート済みマップにまとめます。
///
/// 基本辞書に含まれる単語と、先に読み込んだソースにすでにある単語は読み飛ばします。
/// 各ソースは全行を読み終えてから統合されるため、途中で失敗したソースの単語は一つも入りません。
/// 先頭のソースが一次ソースです。
///
/// # エラー
///
/// 一次ソースのファイルを読めない場合にエラーを返します。
/// 不正な行を含むソースと、読めない二次ソースはエラーログに記録され、そのソースだけが読み飛ばされます。
pub fn load_all<B>(sources: &[DictionarySource], base: &B) -> Result<BTreeMap<String, Attribute>>
where
    B: BaseDictionary + ?Sized,
{
    load_sources(sources, sources.first().map(DictionarySource::path), base)
}

fn load_sources<B>(
    sources: &[DictionarySource],
    primary_path: Option<&Path>,
    base: &B,
) -> Result<BTreeMap<String, Attribute>>
where
    B: BaseDictionary + ?Sized,
{
    let mut map = BTreeMap::new();
    for source in sources {
        let start = Instant::now();
        let entries = match read_source_file(source) {
            Ok(entries) => entries,
            Err(e @ HanlexError::Io(_)) if primary_path == Some(source.path()) => {
                log::error!(
                    "[hanlex] Failed to read the primary dictionary {}: {e}",
                    source.path().display()
                );
                return Err(e);
            }
            Err(e) => {
                log::error!(
                    "[hanlex] Skipped dictionary source {}: {e}",
                    source.path().display()
                );
                continue;
            }
        };
        let mut num_added = 0;
        for (word, attr) in entries {
            if base.contains(&word) || map.contains_key(&word) {
                continue;
            }
            map.insert(word, attr);
            num_added += 1;
        }
        log::info!(
            "[hanlex] Loaded {num_added} words from {} in {} ms",
            source.path().display(),
            start.elapsed().as_millis()
        );
    }
    Ok(map)
}

/// ソースからオートマトンを構築し、キャッシュに書き出します。
///
/// キャッシュの書き出しに失敗しても警告を記録するだけで、構築したオートマトンを返します。
pub fn build<B>(config: &DictionaryConfig, base: &B) -> Result<DoubleArrayAutomaton<Attribute>>
where
    B: BaseDictionary + ?Sized,
{
    let map = load_sources(config.sources(), Some(config.primary_path()), base)?;
    let start = Instant::now();
    let automaton = DoubleArrayAutomaton::from_map(map)?;
    log::info!(
        "[hanlex] Built the automaton of {} words in {} ms",
        automaton.size(),
        start.elapsed().as_millis()
    );

    let cache_path = config.cache_path();
    match cache::write_cache(&cache_path, &automaton) {
        Ok(()) => log::info!("[hanlex] Cached the dictionary to {}", cache_path.display()),
        Err(e) => log::warn!(
            "[hanlex] Failed to cache the dictionary to {}: {e}",
            cache_path.display()
        ),
    }
    Ok(automaton)
}

/// キャッシュを優先してオートマトンを読み込みます。
///
/// キャッシュが存在しないか壊れている場合は、ソースから構築し直します。
pub fn load<B>(config: &DictionaryConfig, base: &B) -> Result<DoubleArrayAutomaton<Attribute>>
where
    B: BaseDictionary + ?Sized,
{
    let start = Instant::now();
    let cache_path = config.cache_path();
    match cache::read_cache(&cache_path) {
        Ok(automaton) => {
            log::info!(
                "[hanlex] Loaded {} words from {} in {} ms",
                automaton.size(),
                cache_path.display(),
                start.elapsed().as_millis()
            );
            return Ok(automaton);
        }
        Err(e) => log::warn!(
            "[hanlex] Cannot use the cache {}: {e}",
            cache_path.display()
        ),
    }
    build(config, base)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use crate::dictionary::base::{NoBase, WordSet};

    #[test]
    fn test_read_source() {
        let data = "\u{feff}裸婚\n\n大数据 n 10 v 2\n云计算 vn 3 n\n";
        let entries = read_source(data.as_bytes(), Nature::Nz).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, "裸婚");
        assert_eq!(entries[0].1, Attribute::new(Nature::Nz));
        assert_eq!(entries[1].1.total_frequency(), 12);
        assert_eq!(entries[2].1, Attribute::with_frequency(Nature::Vn, 3));
    }

    #[test]
    fn test_read_source_bad_tag() {
        let data = "好词 n 1\n坏词 zz 1\n";
        assert!(read_source(data.as_bytes(), Nature::N).is_err());
        let data = "坏词 n x\n";
        assert!(read_source(data.as_bytes(), Nature::N).is_err());
    }

    #[test]
    fn test_load_all_merge() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("custom.txt");
        let secondary = dir.path().join("places.txt");
        let broken = dir.path().join("broken.txt");
        fs::write(&primary, "裸婚 nz 1\n中国\n大数据 n 10\n").unwrap();
        fs::write(&secondary, "大数据 v 99\n北京\n").unwrap();
        fs::write(&broken, "早词 n 1\n坏词 zz 1\n").unwrap();

        let sources = vec![
            DictionarySource::new(&primary, Nature::N),
            DictionarySource::new(&broken, Nature::N),
            DictionarySource::new(&secondary, Nature::Ns),
            DictionarySource::new(dir.path().join("missing.txt"), Nature::N),
        ];
        let base: WordSet = ["中国"].into_iter().collect();
        let map = load_all(&sources, &base).unwrap();

        let words: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(words, vec!["北京", "大数据", "裸婚"]);
        assert_eq!(map["大数据"], Attribute::with_frequency(Nature::N, 10));
        assert_eq!(map["北京"], Attribute::new(Nature::Ns));
    }

    #[test]
    fn test_load_all_missing_primary() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![DictionarySource::new(dir.path().join("missing.txt"), Nature::N)];
        assert!(load_all(&sources, &NoBase).is_err());
    }

    #[test]
    fn test_load_all_skips_bad_primary_lines() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("custom.txt");
        let secondary = dir.path().join("places.txt");
        fs::write(&primary, "裸婚 nz 1\n坏词 zz 1\n").unwrap();
        fs::write(&secondary, "北京\n").unwrap();

        let sources = vec![
            DictionarySource::new(&primary, Nature::N),
            DictionarySource::new(&secondary, Nature::Ns),
        ];
        let map = load_all(&sources, &NoBase).unwrap();
        let words: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(words, vec!["北京"]);
    }

    #[test]
    fn test_build_keeps_missing_secondary_after_skipped_primary() {
        let dir = tempfile::tempdir().unwrap();
        let secondary = dir.path().join("places.txt");
        fs::write(&secondary, "北京\n").unwrap();
        let config: DictionaryConfig = format!(
            "{} zz; missing.txt; places.txt ns",
            dir.path().join("custom.txt").display()
        )
        .parse()
        .unwrap();

        let automaton = build(&config, &NoBase).unwrap();
        assert_eq!(automaton.size(), 1);
        assert!(automaton.get("北京").is_some());
        assert!(dir.path().join("custom.txt.bin").exists());
    }

    #[test]
    fn test_load_prefers_cache() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("custom.txt");
        fs::write(&primary, "裸婚 nz 1\n大数据 n 10\n").unwrap();
        let config = DictionaryConfig::new(vec![DictionarySource::new(&primary, Nature::N)]).unwrap();

        let built = load(&config, &NoBase).unwrap();
        assert_eq!(built.size(), 2);
        assert!(config.cache_path().exists());

        // The cache is used even after the source is gone.
        fs::remove_file(&primary).unwrap();
        let cached = load(&config, &NoBase).unwrap();
        assert_eq!(cached.size(), 2);
        assert_eq!(cached.get("大数据"), built.get("大数据"));

        // A corrupt cache falls back to the sources, which now fail.
        fs::write(config.cache_path(), b"garbage").unwrap();
        assert!(load(&config, &NoBase).is_err());
    }
}
