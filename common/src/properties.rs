// Copyright 2023 The cfbridge Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::errors::{Error, Result};

/// A flat, insertion-ordered configuration store keyed by dotted names
/// such as `db.url` or `mongo.host`.
///
/// The text form follows the `java.util.Properties` rules that the
/// framework applies to its own configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a properties file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ReadPropertiesFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Parse properties text. Keys end at the first unescaped `=`, `:` or
    /// whitespace, lines ending with an odd number of `\` continue on the
    /// next line, and lines starting with `#` or `!` are comments.
    pub fn parse(content: &str) -> Self {
        let mut properties = Properties::new();

        for line in logical_lines(content) {
            let (key, value) = split_entry(&line);
            properties.put(key, value);
        }

        properties
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a value, replacing any previous one in place.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Set a value only when the key is not present yet. Returns whether
    /// the value was written.
    pub fn put_if_absent(&mut self, key: &str, value: impl Into<String>) -> bool {
        if self.contains_key(key) {
            return false;
        }
        self.put(key, value);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `key=value` lines, escaped so that [`Properties::parse`]
    /// reads back the same entries.
    pub fn to_properties_string(&self) -> String {
        self.iter()
            .map(|(key, value)| format!("{}={}\n", escape(key, true), escape(value, false)))
            .collect()
    }

    /// Render as a pretty printed JSON object.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::RenderFailed)
    }

    /// Write the rendered content to `path`.
    pub fn write(path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).map_err(|source| Error::WritePropertiesFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// Join continued lines and drop blank and comment lines. Escapes are kept,
/// they are resolved once the entry is split.
fn logical_lines(content: &str) -> Vec<String> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = vec![];
    let mut pending: Option<String> = None;

    for natural in normalized.split('\n') {
        let trimmed = natural.trim_start_matches(is_blank);

        // Comment markers only count at the start of a logical line.
        if pending.is_none() && (trimmed.is_empty() || trimmed.starts_with(['#', '!'])) {
            continue;
        }

        let mut logical = pending.take().unwrap_or_default();
        let trailing = trimmed.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            logical.push_str(&trimmed[..trimmed.len() - 1]);
            pending = Some(logical);
        } else {
            logical.push_str(trimmed);
            lines.push(logical);
        }
    }

    if let Some(logical) = pending {
        lines.push(logical);
    }
    lines
}

/// Split a logical line into its unescaped key and value.
fn split_entry(line: &str) -> (String, String) {
    let chars: Vec<char> = line.chars().collect();
    let mut key_end = chars.len();
    let mut value_start = chars.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (index, c) in chars.iter().copied().enumerate() {
        if !escaped && (c == '=' || c == ':') {
            key_end = index;
            value_start = index + 1;
            has_separator = true;
            break;
        }
        if !escaped && is_blank(c) {
            key_end = index;
            value_start = index + 1;
            break;
        }
        escaped = c == '\\' && !escaped;
    }

    // Blanks around the separator, and one `=` or `:` after a blank, belong to neither side.
    while let Some(c) = chars.get(value_start).copied() {
        if is_blank(c) {
            value_start += 1;
        } else if !has_separator && (c == '=' || c == ':') {
            has_separator = true;
            value_start += 1;
        } else {
            break;
        }
    }

    let key: String = chars[..key_end].iter().collect();
    let value: String = chars[value_start..].iter().collect();
    (unescape(&key), unescape(&value))
}

fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => unescaped.push('\t'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('f') => unescaped.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                let decoded = Some(&hex)
                    .filter(|hex| hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        unescaped.push(decoded);
                        chars.nth(3);
                    }
                    None => unescaped.push('u'),
                }
            }
            Some(other) => unescaped.push(other),
            None => {}
        }
    }

    unescaped
}

fn escape(text: &str, is_key: bool) -> String {
    let mut escaped = String::with_capacity(text.len());

    for (index, c) in text.chars().enumerate() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{c}' => escaped.push_str("\\f"),
            ' ' if is_key || index == 0 => escaped.push_str("\\ "),
            '=' | ':' | '#' | '!' if is_key => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }

    escaped
}
