//! 辞書キャッシュのバイナリ形式
//!
//! キャッシュは次の順に並んだバイト列です。整数はすべてビッグエンディアンです。
//!
//! 1. 形式タグ [`MAGIC`]
//! 2. 以降のバイト列全体のSHA-256ダイジェスト(32バイト)
//! 3. 単語数`i32`と、単語ごとの属性レコード
//!    (頻度の総和`i32`、組の数`i32`、組ごとに品詞の序数`i32`と頻度`i32`)
//! 4. オートマトンの遷移表
//!
//! 属性レコードはオートマトンの終端IDの順に並びます。

use std::fs::File;
use std::io::Write;
use std::path::Path;

use memmap2::Mmap;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::attribute::Attribute;
use crate::dictionary::automaton::DoubleArrayAutomaton;
use crate::errors::{HanlexError, Result};
use crate::nature::Nature;
use crate::utils::ByteReader;

/// キャッシュの形式タグ
pub const MAGIC: &[u8] = b"HanlexCustomDictionary 0.1\n";

/// キャッシュファイルの拡張子。一次ソースのパスの末尾に付加されます。
pub const CACHE_EXT: &str = ".bin";

const DIGEST_LEN: usize = 32;

#[inline(always)]
fn push_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// オートマトンとその属性表をキャッシュのバイト列に変換します。
///
/// # エラー
///
/// 単語数や頻度が`i32`に収まらない場合、または遷移表のシリアライズに失敗した場合にエラーを返します。
pub fn encode(automaton: &DoubleArrayAutomaton<Attribute>) -> Result<Vec<u8>> {
    let mut body = vec![];
    push_i32(&mut body, i32::try_from(automaton.size())?);
    for attr in automaton.values() {
        push_i32(&mut body, i32::try_from(attr.total_frequency())?);
        push_i32(&mut body, i32::try_from(attr.len())?);
        for (nature, frequency) in attr.iter() {
            push_i32(&mut body, i32::from(nature.ordinal()));
            push_i32(&mut body, i32::try_from(frequency)?);
        }
    }
    automaton.save(&mut body)?;

    let digest = Sha256::digest(&body);
    let mut blob = Vec::with_capacity(MAGIC.len() + DIGEST_LEN + body.len());
    blob.extend_from_slice(MAGIC);
    blob.extend_from_slice(&digest);
    blob.extend_from_slice(&body);
    Ok(blob)
}

/// [`encode`]で作成したバイト列からオートマトンを復元します。
///
/// # エラー
///
/// 形式タグやダイジェストが一致しない場合、データが途中で終わっている場合、
/// 余分なバイトが続く場合、または属性レコードや遷移表が不正な場合にエラーを返します。
pub fn decode(bytes: &[u8]) -> Result<DoubleArrayAutomaton<Attribute>> {
    let mut rdr = ByteReader::new(bytes, "cache");
    if rdr.take(MAGIC.len())? != MAGIC {
        return Err(HanlexError::invalid_format(
            "cache",
            "the format tag does not match",
        ));
    }
    let expected = rdr.take(DIGEST_LEN)?;
    let body = rdr.remaining();
    let actual = Sha256::digest(body);
    if actual.as_slice() != expected {
        return Err(HanlexError::invalid_format(
            "cache",
            format!(
                "digest mismatch: expected {}, computed {}",
                hex::encode(expected),
                hex::encode(actual)
            ),
        ));
    }

    let mut rdr = ByteReader::new(body, "cache");
    let num_words = rdr.next_len()?;
    // Each record takes at least 8 bytes.
    let mut values = Vec::with_capacity(num_words.min(body.len() / 8));
    for i in 0..num_words {
        values.push(read_attribute(&mut rdr, i)?);
    }

    let mut tables = rdr.remaining();
    let automaton = DoubleArrayAutomaton::load(&mut tables, values)?;
    if !tables.is_empty() {
        return Err(HanlexError::invalid_format(
            "cache",
            format!("{} trailing bytes", tables.len()),
        ));
    }
    Ok(automaton)
}

fn read_attribute(rdr: &mut ByteReader, i: usize) -> Result<Attribute> {
    let total = rdr.next_i32()?;
    let num_pairs = rdr.next_len()?;
    let mut pairs = Vec::with_capacity(num_pairs.min(rdr.remaining().len() / 8));
    for _ in 0..num_pairs {
        let ordinal = rdr.next_len()?;
        let nature = Nature::from_ordinal(ordinal).ok_or_else(|| {
            HanlexError::invalid_format("cache", format!("unknown tag ordinal {ordinal} at record {i}"))
        })?;
        let frequency = rdr.next_len()?;
        pairs.push((nature, u32::try_from(frequency)?));
    }
    let attr = Attribute::from_pairs(pairs)?;
    if i64::from(attr.total_frequency()) != i64::from(total) {
        return Err(HanlexError::invalid_format(
            "cache",
            format!(
                "record {i} stores total frequency {total}, but its frequencies sum to {}",
                attr.total_frequency()
            ),
        ));
    }
    Ok(attr)
}

/// キャッシュを書き出します。
///
/// 同じディレクトリに一時ファイルを作成してから置き換えるため、
/// 書き込みが途中で失敗しても既存のキャッシュが壊れることはありません。
pub fn write_cache<P>(path: P, automaton: &DoubleArrayAutomaton<Attribute>) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let blob = encode(automaton)?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&blob)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// キャッシュを読み込みます。
pub fn read_cache<P>(path: P) -> Result<DoubleArrayAutomaton<Attribute>>
where
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    // The cache is only read here, and writers replace it by an atomic persist
    // instead of truncating it in place.
    let mmap = unsafe { Mmap::map(&file)? };
    decode(&mmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    fn sample() -> DoubleArrayAutomaton<Attribute> {
        let mut map = BTreeMap::new();
        map.insert("裸婚".to_string(), "nz 1".parse::<Attribute>().unwrap());
        map.insert("大数据".to_string(), "n 10 v 2".parse::<Attribute>().unwrap());
        map.insert("数据".to_string(), "n 5".parse::<Attribute>().unwrap());
        DoubleArrayAutomaton::from_map(map).unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let automaton = sample();
        let decoded = decode(&encode(&automaton).unwrap()).unwrap();
        assert_eq!(decoded.size(), 3);
        assert_eq!(decoded.values(), automaton.values());
        assert_eq!(decoded.get("大数据").map(|a| a.total_frequency()), Some(12));
        assert_eq!(decoded.get("裸婚").map(|a| a.natures()), Some(&[Nature::Nz][..]));
        assert_eq!(decoded.get("大数"), None);

        let mut hits: Vec<(usize, usize)> = decoded
            .matches("大数据裸婚")
            .into_iter()
            .map(|h| (h.begin, h.end))
            .collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![(0, 3), (1, 3), (3, 5)]);
    }

    #[test]
    fn test_empty_roundtrip() {
        let automaton = DoubleArrayAutomaton::<Attribute>::empty();
        let blob = encode(&automaton).unwrap();
        let decoded = decode(&blob).unwrap();
        assert!(decoded.is_empty());
        assert!(decoded.matches("任何文本").is_empty());
    }

    #[test]
    fn test_body_layout() {
        let blob = encode(&sample()).unwrap();
        let body = &blob[MAGIC.len() + DIGEST_LEN..];
        // 3 words; "大数据" sorts first: total 12, 2 pairs, (n, 10), (v, 2)
        assert_eq!(&body[0..4], &3i32.to_be_bytes());
        assert_eq!(&body[4..8], &12i32.to_be_bytes());
        assert_eq!(&body[8..12], &2i32.to_be_bytes());
        let n = i32::from(Nature::N.ordinal());
        assert_eq!(&body[12..16], &n.to_be_bytes());
        assert_eq!(&body[16..20], &10i32.to_be_bytes());
    }

    #[test]
    fn test_rejects_corruption() {
        let blob = encode(&sample()).unwrap();

        let mut flipped = blob.clone();
        let last = flipped.len() - 1;
        flipped[last] ^= 0xFF;
        assert!(decode(&flipped).is_err());

        let mut bad_magic = blob.clone();
        bad_magic[0] = b'X';
        assert!(decode(&bad_magic).is_err());

        assert!(decode(&blob[..blob.len() - 1]).is_err());
        assert!(decode(&blob[..MAGIC.len() + 4]).is_err());
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let blob = encode(&sample()).unwrap();
        let mut body = blob[MAGIC.len() + DIGEST_LEN..].to_vec();
        body.push(0);
        let mut tampered = MAGIC.to_vec();
        tampered.extend_from_slice(&Sha256::digest(&body));
        tampered.extend_from_slice(&body);
        assert!(decode(&tampered).is_err());
    }

    #[test]
    fn test_rejects_wrong_total() {
        let blob = encode(&sample()).unwrap();
        let mut body = blob[MAGIC.len() + DIGEST_LEN..].to_vec();
        body[4..8].copy_from_slice(&13i32.to_be_bytes());
        let mut tampered = MAGIC.to_vec();
        tampered.extend_from_slice(&Sha256::digest(&body));
        tampered.extend_from_slice(&body);
        assert!(decode(&tampered).is_err());
    }

    #[test]
    fn test_write_read_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.txt.bin");
        write_cache(&path, &sample()).unwrap();
        let loaded = read_cache(&path).unwrap();
        assert_eq!(loaded.size(), 3);
        assert!(read_cache(dir.path().join("missing.bin")).is_err());
    }
}
