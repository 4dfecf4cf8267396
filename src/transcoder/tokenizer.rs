//! Splits hex-dump text (`tcpdump -X` style) into per-packet hex payloads.
//!
//! A dump looks like this:
//!
//! ```text
//! 12:00:00.000001 IP 10.0.0.1.80 > 10.0.0.2.51000: Flags [P.], length 5
//! 	0x0000:  4500 0034 1a2b 4000 4006 0000 0a00 0001  E..4.+..@.@.....
//! 	0x0010:  4865 6c6c 6f                             Hello
//! ```
//!
//! Every line is classified as a record start, a continuation or a separator, and a
//! two-state machine (`Idle`/`InRecord`) turns that stream of classes into records.
use std::mem;

use crate::config::{ImageConfig, MarkerRule};
use super::containers::HexPayload;

/// Lines no longer than this end the current record.
const SEPARATOR_MAX_LEN: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Start,
    Continuation,
    Separator,
}

#[derive(Debug)]
enum State {
    Idle,
    InRecord(HexPayload),
}

/// Classifies one dump line under `rule`.
///
/// Start markers win over the separator check, so a one-character line can never
/// start a record but a line holding "IP" always does under [MarkerRule::Substring].
pub fn classify_line(line: &str, rule: MarkerRule) -> LineKind {
    let is_start = match rule {
        MarkerRule::Substring => line.contains("IP"),
        MarkerRule::Header => is_header_line(line),
    };

    if is_start {
        LineKind::Start
    } else if line.len() <= SEPARATOR_MAX_LEN {
        LineKind::Separator
    } else {
        LineKind::Continuation
    }
}

fn is_header_line(line: &str) -> bool {
    if line.trim_start().starts_with("0x") {
        return false;
    }
    line.split_whitespace().any(|token| token == "IP" || token == "IP6")
}

/// Reduces a continuation line to the hex column.
///
/// Drops everything up to the last `":  "` preceded by an `0x` offset label, then cuts
/// the ASCII rendering that follows the first double space. The caller strips what
/// is left of non-alphanumerics.
pub fn hex_column(line: &str) -> &str {
    let body = line
        .rmatch_indices(":  ")
        .find(|(pos, _)| line[..*pos].contains("0x"))
        .map_or(line, |(pos, sep)| &line[pos + sep.len()..]);

    match body.find("  ") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Lazily yields one [HexPayload] per record, in dump order.
///
/// Lines are pulled only as far as the next record boundary. Records with no body
/// are still yielded, empty.
pub struct DumpTokenizer<'a> {
    lines: Box<dyn Iterator<Item = &'a str> + 'a>,
    rule: MarkerRule,
    state: State,
    next_index: usize,
}

impl<'a> DumpTokenizer<'a> {
    pub fn new(text: &'a str, config: &'a ImageConfig) -> Self {
        match config.separator() {
            Some(separator) => Self::from_lines(text.split(separator), config),
            None => Self::from_lines(text.lines(), config),
        }
    }

    /// Tokenizes lines that were already split off the dump.
    pub fn from_lines<I>(lines: I, config: &ImageConfig) -> Self
    where
        I: Iterator<Item = &'a str> + 'a,
    {
        Self {
            lines: Box::new(lines),
            rule: config.marker(),
            state: State::Idle,
            next_index: 0,
        }
    }

    fn open_record(&mut self) -> Option<HexPayload> {
        let fresh = State::InRecord(HexPayload::new(self.next_index, ""));
        self.next_index += 1;
        Self::finished(mem::replace(&mut self.state, fresh))
    }

    fn close_record(&mut self) -> Option<HexPayload> {
        Self::finished(mem::replace(&mut self.state, State::Idle))
    }

    fn finished(state: State) -> Option<HexPayload> {
        match state {
            State::InRecord(payload) => {
                log::debug!("Tokenized {payload}");
                Some(payload)
            }
            State::Idle => None,
        }
    }
}

impl Iterator for DumpTokenizer<'_> {
    type Item = HexPayload;

    fn next(&mut self) -> Option<HexPayload> {
        while let Some(line) = self.lines.next() {
            let emitted = match classify_line(line, self.rule) {
                LineKind::Start => self.open_record(),
                LineKind::Separator => self.close_record(),
                LineKind::Continuation => {
                    if let State::InRecord(payload) = &mut self.state {
                        payload.push_stripped(hex_column(line));
                    }
                    None
                }
            };

            if emitted.is_some() {
                return emitted;
            }
        }

        self.close_record()
    }
}
