//! Series pattern inference for serial-dl
//!
//! Turns the URL of the last file of a numbered series, plus the number of
//! its first file, into the ordered list of files to fetch. Filenames are
//! scanned by character class: a letter run, the first digit run, a letter
//! run, then the extension.

use std::path::{Path, PathBuf};

use crate::core::error::{Error, Result};

/// Naming pattern of a numbered file series, inferred once from a sample URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSpec {
    /// Everything before the final path segment, without trailing slash
    pub directory: String,

    /// Letters directly before the number (may be empty)
    pub prefix: String,

    /// Letters directly after the number, before the extension (may be empty)
    pub suffix: String,

    /// Extension including its leading dot (may be empty)
    pub extension: String,

    /// First number of the series, from the start token
    pub start_value: u64,

    /// Last number of the series, from the sample filename
    pub end_value: u64,

    /// Digits in the start token; every number is zero-filled to this width
    pub zero_fill_width: usize,
}

impl SequenceSpec {
    /// Infer the series pattern from the last file's URL and the start token.
    ///
    /// Fails with [`Error::NoNumberFound`] when the sample filename has no
    /// digits and with [`Error::InvalidStart`] when the start token is not a
    /// non-negative integer.
    pub fn infer(sample_url: &str, start_token: &str) -> Result<Self> {
        let filename = file_name(sample_url);
        let end_value = parse_numeric_token(filename)?;
        let start_value = parse_start_value(start_token)?;

        Ok(Self {
            directory: parse_directory(sample_url),
            prefix: parse_prefix(filename),
            suffix: parse_suffix(filename),
            extension: parse_extension(filename),
            start_value,
            end_value,
            zero_fill_width: compute_zero_fill_width(start_token),
        })
    }

    /// Number of files in the series; zero when start is past end.
    pub fn len(&self) -> usize {
        if self.start_value > self.end_value {
            return 0;
        }
        let span = self.end_value - self.start_value;
        usize::try_from(span)
            .ok()
            .and_then(|span| span.checked_add(1))
            .unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-filled token for `n`. Wider numbers are never truncated.
    pub fn token_for(&self, n: u64) -> String {
        format!("{:0width$}", n, width = self.zero_fill_width)
    }

    /// Source URL of file number `n`
    pub fn url_for(&self, n: u64) -> String {
        format!(
            "{}/{}{}{}{}",
            self.directory,
            self.prefix,
            self.token_for(n),
            self.suffix,
            self.extension
        )
    }

    /// Lazily expand the pattern into one [`TargetItem`] per number, in order.
    ///
    /// Expansion only reads `self`, so calling it twice yields the same items.
    pub fn expand(&self) -> Targets<'_> {
        Targets {
            spec: self,
            next_value: self.start_value,
            position: 0,
            remaining: self.len(),
        }
    }
}

/// One file to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetItem {
    /// 1-based position within the run
    pub position: usize,

    /// Zero-filled number, shared by the source URL and the local filename
    pub token: String,

    pub source_url: String,

    /// Local filename: token plus the sample's extension
    pub file_name: String,
}

impl TargetItem {
    /// Where this item lands inside `out_dir`
    pub fn destination_in(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(&self.file_name)
    }
}

/// Iterator returned by [`SequenceSpec::expand`]
#[derive(Debug, Clone)]
pub struct Targets<'a> {
    spec: &'a SequenceSpec,
    next_value: u64,
    position: usize,
    remaining: usize,
}

impl Iterator for Targets<'_> {
    type Item = TargetItem;

    fn next(&mut self) -> Option<TargetItem> {
        if self.remaining == 0 {
            return None;
        }

        let value = self.next_value;
        self.next_value = value.saturating_add(1);
        self.remaining -= 1;
        self.position += 1;

        let token = self.spec.token_for(value);
        Some(TargetItem {
            position: self.position,
            source_url: self.spec.url_for(value),
            file_name: format!("{}{}", token, self.spec.extension),
            token,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Targets<'_> {}

/// Final `/`-delimited segment of a URL
fn file_name(url: &str) -> &str {
    match url.rsplit_once('/') {
        Some((_, name)) => name,
        None => url,
    }
}

/// Everything before the final `/`-delimited segment, without trailing slash
pub fn parse_directory(sample_url: &str) -> String {
    match sample_url.rsplit_once('/') {
        Some((directory, _)) => directory.to_string(),
        None => String::new(),
    }
}

/// Byte range of the first maximal run of ASCII digits
fn first_digit_run(filename: &str) -> Option<(usize, usize)> {
    let bytes = filename.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let len = bytes[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    Some((start, start + len))
}

/// Value of the first digit run in `filename`
pub fn parse_numeric_token(filename: &str) -> Result<u64> {
    let (start, end) =
        first_digit_run(filename).ok_or_else(|| Error::NoNumberFound(filename.to_string()))?;
    let digits = &filename[start..end];
    digits.parse::<u64>().map_err(|_| {
        Error::InvalidInput(format!("number {digits} in '{filename}' is too large"))
    })
}

/// Letter run immediately before the first digit run
pub fn parse_prefix(filename: &str) -> String {
    let Some((start, _)) = first_digit_run(filename) else {
        return String::new();
    };
    let len = filename.as_bytes()[..start]
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    filename[start - len..start].to_string()
}

/// Letter run immediately after the first digit run, inside the stem
pub fn parse_suffix(filename: &str) -> String {
    let Some((_, end)) = first_digit_run(filename) else {
        return String::new();
    };
    let stem_end = filename.len() - parse_extension(filename).len();
    if end >= stem_end {
        return String::new();
    }
    let len = filename.as_bytes()[end..stem_end]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    filename[end..end + len].to_string()
}

/// Last `.`-delimited component with its dot.
///
/// Hidden-file names (`.profile`) and names ending in a dot have none.
pub fn parse_extension(filename: &str) -> String {
    match filename.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < filename.len() => filename[dot..].to_string(),
        _ => String::new(),
    }
}

/// Count of digit characters in the start token, leading zeros included
pub fn compute_zero_fill_width(start_token: &str) -> usize {
    start_token.chars().filter(char::is_ascii_digit).count()
}

fn parse_start_value(start_token: &str) -> Result<u64> {
    let trimmed = start_token.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidStart(start_token.to_string()));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| Error::InvalidStart(start_token.to_string()))
}
