//! Reader for KNP `-tab` output
//!
//! One sentence looks like:
//!
//! ```text
//! # S-ID:1 KNP:5.0 SCORE:-12.3
//! * 2D <体言><係:ガ格>
//! + 2D <体言><係:ガ格>
//! 熊 くま 熊 名詞 6 普通名詞 1 * 0 * 0 "代表表記:熊/くま カテゴリ:動物" <...>
//! が が が 助詞 9 格助詞 1 * 0 * 0 NIL <付属>
//! ...
//! + -1D <用言:動><格解析結果:泳ぐ/およぐ:動1:ガ/C/熊/0/0/1;デ/C/川/1/0/1>
//! EOS
//! ```
//!
//! `*` lines open a chunk (bunsetsu), `+` lines open a tag (basic phrase),
//! every other line is a morpheme belonging to the current chunk and tag.

use super::traits::ParseError;
use super::types::{canonical_text, CaseArgument, Chunk, ChunkKind, Morpheme, ParsedSentence, PredicateTag};

/// End-of-sentence marker shared by Juman++ and KNP
pub const EOS: &str = "EOS";

const CASE_ANALYSIS: &str = "格解析結果";

/// Number of space-separated fields before the semantic-info column
const MORPHEME_FIELDS: usize = 11;

#[derive(Debug, Default)]
struct RawUnit {
    parent: Option<usize>,
    features: String,
    morphemes: Vec<Morpheme>,
}

/// Read one sentence of KNP `-tab` output
pub fn read_tab(output: &str) -> Result<ParsedSentence, ParseError> {
    let mut chunks: Vec<RawUnit> = Vec::new();
    let mut tags: Vec<RawUnit> = Vec::new();
    let mut morphemes: Vec<Morpheme> = Vec::new();

    for (index, line) in output.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if line == EOS {
            break;
        }
        if line.starts_with(";;") {
            return Err(ParseError::Analyzer(line.trim_start_matches(';').trim().to_string()));
        }
        if let Some(unit) = parse_header(line, '*') {
            chunks.push(unit);
            continue;
        }
        if let Some(unit) = parse_header(line, '+') {
            if chunks.is_empty() {
                return Err(malformed(line_no, "tag line before any chunk line"));
            }
            tags.push(unit);
            continue;
        }
        match parse_morpheme(line) {
            Some(morpheme) => {
                let chunk = chunks
                    .last_mut()
                    .ok_or_else(|| malformed(line_no, "morpheme line before any chunk line"))?;
                chunk.morphemes.push(morpheme.clone());
                if let Some(tag) = tags.last_mut() {
                    tag.morphemes.push(morpheme.clone());
                }
                morphemes.push(morpheme);
            }
            None if line.starts_with('#') => continue,
            None => return Err(malformed(line_no, "unrecognized line")),
        }
    }

    let tag_texts: Vec<String> = tags.iter().map(|t| canonical_text(&t.morphemes)).collect();
    let predicates = tags
        .iter()
        .zip(&tag_texts)
        .filter_map(|(tag, text)| {
            let cases = feature_value(&tag.features, CASE_ANALYSIS)?;
            Some(PredicateTag {
                text: text.clone(),
                arguments: case_arguments(cases, &tag_texts),
            })
        })
        .collect();

    let chunk_count = chunks.len();
    let chunks = chunks
        .into_iter()
        .map(|unit| {
            let kind = chunk_kind(&unit.features);
            let mut chunk = Chunk::from_morphemes(unit.morphemes, kind);
            chunk.parent = unit.parent.filter(|&p| p < chunk_count);
            chunk
        })
        .collect();

    Ok(ParsedSentence {
        morphemes,
        chunks,
        predicates,
    })
}

fn malformed(line: usize, message: &str) -> ParseError {
    ParseError::Malformed {
        line,
        message: message.to_string(),
    }
}

/// Parse `* 2D <features>` / `+ -1D <features>`
fn parse_header(line: &str, marker: char) -> Option<RawUnit> {
    let rest = line.strip_prefix(marker)?.strip_prefix(' ')?;
    let (dependency, features) = rest.split_once(' ').unwrap_or((rest, ""));
    let digits = dependency.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    if digits.len() == dependency.len() {
        return None;
    }
    let parent: i64 = digits.parse().ok()?;
    Some(RawUnit {
        parent: usize::try_from(parent).ok(),
        features: features.to_string(),
        morphemes: Vec::new(),
    })
}

fn chunk_kind(features: &str) -> ChunkKind {
    if features.contains("<用言:動>") {
        ChunkKind::Verb
    } else if features.contains("<用言:形>") {
        ChunkKind::Adjective
    } else if features.contains("<体言>") {
        ChunkKind::Noun
    } else {
        ChunkKind::Unknown
    }
}

/// Split off `count` space-separated fields; `\ ` is an escaped space
fn split_fields(line: &str, count: usize) -> Option<(Vec<&str>, &str)> {
    let mut fields = Vec::with_capacity(count);
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ' ' => {
                fields.push(&line[start..i]);
                start = i + 1;
                if fields.len() == count {
                    return Some((fields, &line[start..]));
                }
            }
            _ => {}
        }
    }
    if fields.len() + 1 == count {
        fields.push(&line[start..]);
        return Some((fields, ""));
    }
    None
}

fn parse_morpheme(line: &str) -> Option<Morpheme> {
    let (fields, rest) = split_fields(line, MORPHEME_FIELDS)?;
    // Part-of-speech id column is always numeric
    fields[4].parse::<u32>().ok()?;

    let (imis, features) = match rest.strip_prefix('"') {
        Some(quoted) => match quoted.split_once('"') {
            Some((imis, features)) => (imis, features.trim_start()),
            None => (quoted, ""),
        },
        None => rest.split_once(' ').unwrap_or((rest, "")),
    };

    Some(Morpheme {
        surface: unescape(fields[0]),
        base: unescape(fields[2]),
        category: fields[5].to_string(),
        representative: representative(imis, features),
        subcategories: subcategories(imis),
    })
}

fn unescape(field: &str) -> String {
    field.replace("\\ ", " ")
}

/// `熊` from `代表表記:熊/くま`, looked up in the semantic info first
fn representative(imis: &str, features: &str) -> String {
    let from_imis = imis.split_whitespace().find_map(|item| item.strip_prefix("代表表記:"));
    let value = from_imis.or_else(|| feature_value(features, "代表表記"));
    value
        .and_then(|v| v.split('/').next())
        .unwrap_or_default()
        .to_string()
}

/// Tags of the last `カテゴリ:` entry, split on `;`
fn subcategories(imis: &str) -> Vec<String> {
    let Some(position) = imis.rfind("カテゴリ:") else {
        return Vec::new();
    };
    let value = &imis[position + "カテゴリ:".len()..];
    let value = value.split(|c: char| c.is_whitespace() || c == '"').next().unwrap_or("");
    value
        .split(';')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Value of `<name:value>` in a feature string
fn feature_value<'a>(features: &'a str, name: &str) -> Option<&'a str> {
    let key = format!("<{}:", name);
    let start = features.find(&key)? + key.len();
    let end = features[start..].find('>')? + start;
    Some(&features[start..end])
}

/// Arguments of `REP:CFID:case/flag/midasi/tid/sdist/sid;...`
///
/// Unassigned slots (`U`, `-`), arguments in other sentences and tag ids
/// outside this sentence are dropped. Arguments are grouped by case in
/// order of first appearance.
fn case_arguments(value: &str, tag_texts: &[String]) -> Vec<CaseArgument> {
    let mut parts = value.splitn(3, ':');
    let cases = match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(_), Some(cases)) => cases,
        _ => return Vec::new(),
    };

    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for entry in cases.split(';').filter(|e| !e.is_empty()) {
        let items: Vec<&str> = entry.split('/').collect();
        if items.len() < 4 {
            tracing::debug!(entry, "skipping short case entry");
            continue;
        }
        let (case, flag) = (items[0], items[1]);
        if flag == "U" || flag == "-" {
            continue;
        }
        let Ok(tag_id) = items[3].parse::<usize>() else {
            continue;
        };
        let sentence_distance = items.get(4).and_then(|d| d.parse::<i64>().ok()).unwrap_or(0);
        if sentence_distance != 0 {
            continue;
        }
        let Some(argument) = tag_texts.get(tag_id) else {
            tracing::debug!(entry, tag_id, "case argument refers to unknown tag");
            continue;
        };

        match grouped.iter_mut().find(|(c, _)| c == case) {
            Some((_, arguments)) => arguments.push(argument.clone()),
            None => grouped.push((case.to_string(), vec![argument.clone()])),
        }
    }

    grouped
        .into_iter()
        .flat_map(|(case, arguments)| {
            arguments.into_iter().map(move |argument| CaseArgument {
                case: case.clone(),
                argument,
            })
        })
        .collect()
}
