//! Wikilink scanner: `[[Note]]`, `[[Note|alias]]`, `[[Note#Heading]]`, `![[embed.png]]`
//!
//! One pattern covers both links and embeds so each occurrence is seen once.

use crate::normalize::{classify, split_fragment};
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::LazyLock;
use vaultscan_core::{LinkClass, ScanConfig};

/// `(!?)[[target(|alias)?]]`; group 2 is the target including any fragment.
static WIKILINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").unwrap());

/// Bare URLs in free text.
static EXTERNAL_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s\)\]]+").unwrap());

/// One reference found on one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOccurrence {
    /// Captured target text including any fragment
    pub raw: String,
    /// Target with the fragment removed
    pub target: String,
    /// `#Heading` or `#^block` suffix, possibly empty
    pub fragment: String,
    pub alias: Option<String>,
    /// `![[...]]` form
    pub embed: bool,
    /// 1-based line number
    pub line: usize,
    /// Byte range of `raw` within the line
    pub span: Range<usize>,
}

impl LinkOccurrence {
    /// Same-file heading or block reference
    pub fn is_self_reference(&self) -> bool {
        self.target.is_empty()
    }

    /// Classification of this occurrence
    pub fn class(&self, config: &ScanConfig) -> LinkClass {
        if self.is_self_reference() {
            LinkClass::SelfHeading
        } else {
            classify(&self.target, config)
        }
    }

    /// Lowercase normalized target, the key used for incoming counts
    pub fn key(&self) -> String {
        self.target.to_lowercase()
    }
}

/// All wikilink occurrences on `line`, in offset order.
pub fn scan_line(line: &str, line_number: usize) -> Vec<LinkOccurrence> {
    if !line.contains("[[") {
        return Vec::new();
    }

    WIKILINK_PATTERN
        .captures_iter(line)
        .filter_map(|caps| {
            let target = caps.get(2)?;
            let (base, fragment) = split_fragment(target.as_str());
            Some(LinkOccurrence {
                raw: target.as_str().to_string(),
                target: base.to_string(),
                fragment: fragment.to_string(),
                alias: caps.get(3).map(|m| m.as_str().to_string()),
                embed: caps.get(1).is_some_and(|m| !m.as_str().is_empty()),
                line: line_number,
                span: target.range(),
            })
        })
        .collect()
}

/// Every occurrence in a whole document, lines numbered from 1
pub fn scan_content(content: &str) -> Vec<LinkOccurrence> {
    content
        .lines()
        .enumerate()
        .flat_map(|(idx, line)| scan_line(line, idx + 1))
        .collect()
}

/// Bare `http(s)` URLs with trailing sentence punctuation removed
pub fn external_urls(text: &str) -> Vec<String> {
    EXTERNAL_URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}
