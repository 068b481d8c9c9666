//! Caption Format Parsers and Exporters
//!
//! Supports parsing and exporting captions in:
//! - Canonical JSON (lossless: style and word timings included)
//! - SRT (SubRip)
//! - VTT (WebVTT)
//!
//! SRT and VTT only carry timing and text. Their parsers return [`Cue`]s and the
//! caption store turns them into captions styled from the global template.
//!
//! # Example
//!
//! ```rust,ignore
//! use captionflow_lib::core::captions::{parse_srt, export_vtt};
//!
//! let cues = parse_srt(&srt_content)?;
//! let vtt = export_vtt(&captions);
//! ```

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use specta::Type;

use super::Caption;
use crate::core::{CoreError, TimeMs};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during caption parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid timestamp format
    InvalidTimestamp(String),
    /// Invalid caption format
    InvalidFormat(String),
    /// Missing required data
    MissingData(String),
    /// Unexpected end of input
    UnexpectedEnd,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimestamp(s) => write!(f, "Invalid timestamp: {}", s),
            Self::InvalidFormat(s) => write!(f, "Invalid format: {}", s),
            Self::MissingData(s) => write!(f, "Missing data: {}", s),
            Self::UnexpectedEnd => write!(f, "Unexpected end of input"),
        }
    }
}

impl std::error::Error for ParseError {}

// =============================================================================
// Format Selection
// =============================================================================

/// Interchange formats understood by import/export
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    Json,
    Srt,
    Vtt,
}

impl CaptionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }

    /// Conventional file extension for the format
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for CaptionFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            other => Err(CoreError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timed text cue without styling
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct Cue {
    pub start_ms: TimeMs,
    pub end_ms: TimeMs,
    pub text: String,
}

impl Cue {
    pub fn new(start_ms: TimeMs, end_ms: TimeMs, text: &str) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.to_string(),
        }
    }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{FEFF}').unwrap_or(content)
}

fn checked_cue(start_ms: TimeMs, end_ms: TimeMs, text: String) -> Result<Cue, ParseError> {
    if end_ms <= start_ms {
        return Err(ParseError::InvalidFormat(format!(
            "Cue end must be after start: {} --> {}",
            format_timestamp(start_ms, '.'),
            format_timestamp(end_ms, '.')
        )));
    }
    Ok(Cue {
        start_ms,
        end_ms,
        text,
    })
}

// =============================================================================
// Timestamps
// =============================================================================

/// Parses `HH:MM:SS,mmm`, `HH:MM:SS.mmm` or `MM:SS.mmm` into milliseconds
pub fn parse_timestamp(ts: &str) -> Result<TimeMs, ParseError> {
    let invalid = || ParseError::InvalidTimestamp(ts.to_string());
    let normalized = ts.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();

    let (hours, minutes, seconds_part) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(invalid()),
    };

    let parse_unit = |value: &str| -> Result<TimeMs, ParseError> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        value.parse::<TimeMs>().map_err(|_| invalid())
    };

    let hours = parse_unit(hours)?;
    let minutes = parse_unit(minutes)?;
    if minutes >= 60 {
        return Err(invalid());
    }

    let (secs, frac) = match seconds_part.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (seconds_part, ""),
    };
    let seconds = parse_unit(secs)?;
    if seconds >= 60 {
        return Err(invalid());
    }

    // ".5" means 500 ms; digits past the third are truncated.
    let millis = if frac.is_empty() {
        0
    } else {
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let digits: String = frac.chars().chain(std::iter::repeat('0')).take(3).collect();
        parse_unit(&digits)?
    };

    hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1000 + millis))
        .ok_or_else(invalid)
}

/// Formats milliseconds as `HH:MM:SS{sep}mmm`
pub fn format_timestamp(ms: TimeMs, separator: char) -> String {
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, mins, secs, separator, millis
    )
}

fn parse_timestamp_line(line: &str) -> Result<(TimeMs, TimeMs), ParseError> {
    let parts: Vec<&str> = line.split("-->").collect();
    if parts.len() != 2 {
        return Err(ParseError::InvalidFormat(format!(
            "Expected 'start --> end' format: {}",
            line
        )));
    }

    // VTT allows cue settings after the end timestamp
    let end_part = parts[1].trim();
    let end_str = end_part.split_whitespace().next().unwrap_or(end_part);

    Ok((parse_timestamp(parts[0])?, parse_timestamp(end_str)?))
}

// =============================================================================
// SRT Format
// =============================================================================

/// Parses SRT (SubRip) content into cues
///
/// # SRT Format
///
/// ```text
/// 1
/// 00:00:01,000 --> 00:00:04,000
/// First caption text
///
/// 2
/// 00:00:05,500 --> 00:00:08,000
/// Second caption text
/// with multiple lines
/// ```
pub fn parse_srt(content: &str) -> Result<Vec<Cue>, ParseError> {
    let mut cues = Vec::new();
    let mut lines = strip_bom(content).lines().peekable();

    loop {
        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }

        let Some(first_line) = lines.next() else {
            break;
        };

        // The sequence number is informational; tolerate files that omit it.
        let timestamp_line = if first_line.contains("-->") {
            first_line
        } else {
            lines.next().ok_or(ParseError::UnexpectedEnd)?
        };
        let (start_ms, end_ms) = parse_timestamp_line(timestamp_line)?;

        let mut text_lines = Vec::new();
        while let Some(line) = lines.next_if(|l| !l.trim().is_empty()) {
            text_lines.push(line);
        }

        cues.push(checked_cue(start_ms, end_ms, text_lines.join("\n"))?);
    }

    Ok(cues)
}

/// Exports captions to SRT format
pub fn export_srt(captions: &[Caption]) -> String {
    let mut output = String::new();

    for (index, caption) in captions.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        output.push_str(&format!("{}\n", index + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(caption.start_ms, ','),
            format_timestamp(caption.end_ms, ',')
        ));
        output.push_str(&caption.text);
        output.push('\n');
    }

    output
}

// =============================================================================
// VTT Format
// =============================================================================

/// Parses WebVTT content into cues
///
/// # VTT Format
///
/// ```text
/// WEBVTT
///
/// 00:00:01.000 --> 00:00:04.000
/// First caption text
///
/// intro
/// 00:05.500 --> 00:08.000 align:start
/// <v Speaker>Second</v> caption text
/// ```
pub fn parse_vtt(content: &str) -> Result<Vec<Cue>, ParseError> {
    let mut cues = Vec::new();
    let mut lines = strip_bom(content).lines().peekable();

    match lines.next() {
        Some(first_line) if first_line.starts_with("WEBVTT") => {}
        _ => {
            return Err(ParseError::InvalidFormat(
                "VTT file must start with WEBVTT".to_string(),
            ))
        }
    }

    // Header metadata runs until the first blank line
    while lines.next_if(|l| !l.trim().is_empty()).is_some() {}

    loop {
        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }

        let Some(first_line) = lines.next() else {
            break;
        };

        let block_kind = first_line.split_whitespace().next().unwrap_or("");
        if matches!(block_kind, "NOTE" | "STYLE" | "REGION") {
            while lines.next_if(|l| !l.trim().is_empty()).is_some() {}
            continue;
        }

        let timestamp_line = if first_line.contains("-->") {
            first_line
        } else {
            // Cue identifier; the timing line follows
            lines.next().ok_or(ParseError::UnexpectedEnd)?
        };
        let (start_ms, end_ms) = parse_timestamp_line(timestamp_line)?;

        let mut text_lines = Vec::new();
        while let Some(line) = lines.next_if(|l| !l.trim().is_empty()) {
            text_lines.push(strip_vtt_tags(line));
        }

        cues.push(checked_cue(start_ms, end_ms, text_lines.join("\n"))?);
    }

    Ok(cues)
}

/// Strips VTT formatting tags (`<b>`, `<v Speaker>`, timestamps) from text
fn strip_vtt_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Exports captions to WebVTT format
pub fn export_vtt(captions: &[Caption]) -> String {
    let mut output = String::from("WEBVTT\n");

    for caption in captions {
        output.push('\n');
        output.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(caption.start_ms, '.'),
            format_timestamp(caption.end_ms, '.')
        ));
        output.push_str(&caption.text);
        output.push('\n');
    }

    output
}

// =============================================================================
// Canonical JSON
// =============================================================================

/// Parses the canonical JSON caption array
///
/// Rejects empty or duplicate ids and spans whose end is not after the start.
/// The result is ordered by start time (stable for ties).
pub fn parse_json(content: &str) -> Result<Vec<Caption>, ParseError> {
    let mut captions: Vec<Caption> = serde_json::from_str(strip_bom(content))
        .map_err(|e| ParseError::InvalidFormat(format!("Invalid caption JSON: {}", e)))?;

    let mut seen = HashSet::with_capacity(captions.len());
    for caption in &captions {
        if caption.id.trim().is_empty() {
            return Err(ParseError::MissingData("Caption id".to_string()));
        }
        if !seen.insert(caption.id.as_str()) {
            return Err(ParseError::InvalidFormat(format!(
                "Duplicate caption id: {}",
                caption.id
            )));
        }
        if caption.end_ms <= caption.start_ms {
            return Err(ParseError::InvalidFormat(format!(
                "Caption {} ends before it starts ({} >= {})",
                caption.id, caption.start_ms, caption.end_ms
            )));
        }
    }

    captions.sort_by_key(|c| c.start_ms);
    Ok(captions)
}

/// Exports captions as the canonical pretty-printed JSON array
pub fn export_json(captions: &[Caption]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(captions)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::{CaptionStyle, WordTiming};

    fn caption(id: &str, start_ms: TimeMs, end_ms: TimeMs, text: &str) -> Caption {
        Caption::new(id, start_ms, end_ms, text, CaptionStyle::default())
    }

    // -------------------------------------------------------------------------
    // Timestamps
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_timestamp_variants() {
        assert_eq!(parse_timestamp("00:00:01,500").unwrap(), 1500);
        assert_eq!(parse_timestamp("00:01:30.000").unwrap(), 90_000);
        assert_eq!(parse_timestamp("01:30:00,000").unwrap(), 5_400_000);
        assert_eq!(parse_timestamp("01:23.456").unwrap(), 83_456);
        assert_eq!(parse_timestamp("00:00:02.5").unwrap(), 2500);
        assert_eq!(parse_timestamp(" 00:00:00,100 ").unwrap(), 100);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("00:00:invalid").is_err());
        assert!(parse_timestamp("1:2:3:4").is_err());
        assert!(parse_timestamp("00:61:00,000").is_err());
        assert!(parse_timestamp("-1:00:00,000").is_err());
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("00:00:01.\u{e9}\u{e9}").is_err());
        assert!(parse_timestamp("00:00:01,1\u{e9}").is_err());
        assert!(matches!(
            parse_timestamp("99999999999999:00:00,000"),
            Err(ParseError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0, ','), "00:00:00,000");
        assert_eq!(format_timestamp(1500, ','), "00:00:01,500");
        assert_eq!(format_timestamp(90_000, '.'), "00:01:30.000");
        assert_eq!(format_timestamp(5_400_000, ','), "01:30:00,000");
        assert_eq!(format_timestamp(360_000_001, '.'), "100:00:00.001");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("SRT".parse::<CaptionFormat>().unwrap(), CaptionFormat::Srt);
        assert_eq!("webvtt".parse::<CaptionFormat>().unwrap(), CaptionFormat::Vtt);
        assert_eq!(" json ".parse::<CaptionFormat>().unwrap(), CaptionFormat::Json);
        assert!(matches!(
            "ass".parse::<CaptionFormat>(),
            Err(CoreError::UnsupportedFormat(f)) if f == "ass"
        ));
    }

    // -------------------------------------------------------------------------
    // SRT
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_srt_basic() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello World\n\n2\n00:00:05,500 --> 00:00:08,000\nSecond caption\n";

        let cues = parse_srt(srt).unwrap();
        assert_eq!(
            cues,
            vec![
                Cue::new(1000, 4000, "Hello World"),
                Cue::new(5500, 8000, "Second caption"),
            ]
        );
    }

    #[test]
    fn test_parse_srt_multiline_crlf_and_bom() {
        let srt = "\u{FEFF}1\r\n00:00:00,000 --> 00:00:05,000\r\nLine one\r\nLine two\r\n\r\n";
        let cues = parse_srt(srt).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Line one\nLine two");
    }

    #[test]
    fn test_parse_srt_without_sequence_numbers() {
        let srt = "00:00:01,000 --> 00:00:02,000\nNo index\n";
        let cues = parse_srt(srt).unwrap();
        assert_eq!(cues[0].text, "No index");
    }

    #[test]
    fn test_parse_srt_empty_text_cue() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\nAfter\n";
        let cues = parse_srt(srt).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "");
        assert_eq!(cues[1].text, "After");
    }

    #[test]
    fn test_parse_srt_empty_input() {
        assert!(parse_srt("").unwrap().is_empty());
        assert!(parse_srt("\n\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_srt_invalid_timestamp() {
        let srt = "1\n00:00:invalid --> 00:00:04,000\nHello\n";
        assert!(matches!(
            parse_srt(srt).unwrap_err(),
            ParseError::InvalidTimestamp(_)
        ));
    }

    #[test]
    fn test_parse_srt_rejects_inverted_cue() {
        let srt = "1\n00:00:04,000 --> 00:00:01,000\nBackwards\n";
        assert!(matches!(
            parse_srt(srt).unwrap_err(),
            ParseError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_parse_srt_truncated_block() {
        assert_eq!(parse_srt("1\n").unwrap_err(), ParseError::UnexpectedEnd);
    }

    #[test]
    fn test_export_srt_layout() {
        let captions = vec![
            caption("a", 1000, 4000, "Hello World"),
            caption("b", 5500, 8000, "Second caption"),
        ];

        let srt = export_srt(&captions);
        assert_eq!(
            srt,
            "1\n00:00:01,000 --> 00:00:04,000\nHello World\n\n2\n00:00:05,500 --> 00:00:08,000\nSecond caption\n"
        );
    }

    #[test]
    fn test_srt_roundtrip_keeps_timing_and_text() {
        let original = vec![
            caption("a", 1000, 4000, "First caption"),
            caption("b", 5500, 8500, "Second\nMultiline"),
        ];

        let parsed = parse_srt(&export_srt(&original)).unwrap();
        assert_eq!(parsed.len(), 2);
        for (cue, cap) in parsed.iter().zip(&original) {
            assert_eq!(cue.start_ms, cap.start_ms);
            assert_eq!(cue.end_ms, cap.end_ms);
            assert_eq!(cue.text, cap.text);
        }
    }

    // -------------------------------------------------------------------------
    // VTT
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_vtt_basic() {
        let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nHello World\n\n00:00:05.500 --> 00:00:08.000\nSecond caption\n";
        let cues = parse_vtt(vtt).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0], Cue::new(1000, 4000, "Hello World"));
    }

    #[test]
    fn test_parse_vtt_identifiers_settings_and_notes() {
        let vtt = "WEBVTT - demo\nKind: captions\n\nNOTE this is ignored\nstill a note\n\nintro\n00:01.000 --> 00:04.000 align:start line:90%\n<v Speaker>Hello</v> <b>World</b>\n\nSTYLE\n::cue { color: red }\n\n00:00:05.000 --> 00:00:08.000\nSecond\n";

        let cues = parse_vtt(vtt).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0], Cue::new(1000, 4000, "Hello World"));
        assert_eq!(cues[1].text, "Second");
    }

    #[test]
    fn test_parse_vtt_missing_header() {
        let vtt = "00:00:01.000 --> 00:00:04.000\nHello\n";
        assert!(matches!(
            parse_vtt(vtt).unwrap_err(),
            ParseError::InvalidFormat(_)
        ));
        assert!(parse_vtt("").is_err());
    }

    #[test]
    fn test_export_vtt_layout() {
        let captions = vec![caption("a", 1000, 4000, "Hello World")];
        assert_eq!(
            export_vtt(&captions),
            "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nHello World\n"
        );
        assert_eq!(export_vtt(&[]), "WEBVTT\n");
    }

    #[test]
    fn test_vtt_roundtrip_keeps_timing_and_text() {
        let original = vec![
            caption("a", 0, 1500, "First caption"),
            caption("b", 1500, 3000, "Second caption"),
        ];
        let parsed = parse_vtt(&export_vtt(&original)).unwrap();
        assert_eq!(parsed[0], Cue::new(0, 1500, "First caption"));
        assert_eq!(parsed[1], Cue::new(1500, 3000, "Second caption"));
    }

    // -------------------------------------------------------------------------
    // JSON
    // -------------------------------------------------------------------------

    #[test]
    fn test_json_roundtrip_is_lossless() {
        let mut styled = caption("b", 3000, 6000, "Styled").with_speaker("Ana");
        styled.style.font_size = 30;
        styled.style.bold = true;
        let original = vec![
            caption("a", 0, 3000, "Hello world").with_word_timings(vec![
                WordTiming::new("Hello", 0, 1400),
                WordTiming::new("world", 1400, 3000),
            ]),
            styled.with_confidence(0.75),
        ];

        let json = export_json(&original).unwrap();
        assert_eq!(parse_json(&json).unwrap(), original);
    }

    #[test]
    fn test_parse_json_sorts_by_start() {
        let json = r#"[
            {"id": "late", "start_ms": 5000, "end_ms": 6000, "text": "late"},
            {"id": "early", "start_ms": 0, "end_ms": 1000, "text": "early"}
        ]"#;
        let captions = parse_json(json).unwrap();
        assert_eq!(captions[0].id, "early");
        assert_eq!(captions[1].style, CaptionStyle::default());
    }

    #[test]
    fn test_parse_json_rejects_bad_payloads() {
        assert!(parse_json("not json").is_err());
        assert!(parse_json(r#"{"id": "x"}"#).is_err());

        let duplicate = r#"[
            {"id": "x", "start_ms": 0, "end_ms": 1000, "text": ""},
            {"id": "x", "start_ms": 2000, "end_ms": 3000, "text": ""}
        ]"#;
        assert!(matches!(
            parse_json(duplicate).unwrap_err(),
            ParseError::InvalidFormat(_)
        ));

        let inverted = r#"[{"id": "x", "start_ms": 3000, "end_ms": 1000, "text": ""}]"#;
        assert!(parse_json(inverted).is_err());

        let no_id = r#"[{"id": "", "start_ms": 0, "end_ms": 1000, "text": ""}]"#;
        assert!(matches!(
            parse_json(no_id).unwrap_err(),
            ParseError::MissingData(_)
        ));
    }
}
