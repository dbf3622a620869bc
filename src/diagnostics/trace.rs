//! Call-stack snapshots attached to failures
//!
//! Frames are stored innermost first, which is the order `std::backtrace`
//! prints them in.

use regex::Regex;
use std::backtrace::Backtrace;
use std::sync::OnceLock;

/// One resolved stack frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    symbol: String,
}

impl Frame {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    /// Full demangled symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Symbol without the hash, trailing closure segments and generic arguments
    ///
    /// Handles both legacy (`::{{closure}}`, `::h<hash>`) and v0
    /// (`::{closure#0}`, `::<T>`) demangling.
    fn clean_symbol(&self) -> &str {
        let mut symbol = self.symbol.trim();
        if let Some(idx) = symbol.rfind("::h") {
            let hash = &symbol[idx + 3..];
            if hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()) {
                symbol = &symbol[..idx];
            }
        }
        loop {
            if let Some(stripped) = strip_closure_segment(symbol) {
                symbol = stripped;
            } else if let Some(stripped) = strip_generic_args(symbol) {
                symbol = stripped;
            } else {
                return symbol;
            }
        }
    }

    /// Name of the function this frame belongs to
    pub fn function(&self) -> &str {
        let symbol = self.clean_symbol();
        match symbol.rfind("::") {
            Some(idx) => &symbol[idx + 2..],
            None => symbol,
        }
    }

    /// Everything in front of the function name (module path and type)
    pub fn module_path(&self) -> &str {
        let symbol = self.clean_symbol();
        match symbol.rfind("::") {
            Some(idx) => &symbol[..idx],
            None => "",
        }
    }
}

/// `foo::{{closure}}` or `foo::{closure#0}` -> `foo`
fn strip_closure_segment(symbol: &str) -> Option<&str> {
    let body = symbol.strip_suffix('}')?;
    let idx = body.rfind("::{")?;
    let segment = &body[idx + 3..];
    if segment.contains("::") {
        return None;
    }
    Some(&symbol[..idx])
}

/// `foo::<alloc::string::String>` -> `foo`
fn strip_generic_args(symbol: &str) -> Option<&str> {
    symbol.strip_suffix('>')?;
    let bytes = symbol.as_bytes();
    let mut depth = 0usize;
    for idx in (0..bytes.len()).rev() {
        match bytes[idx] {
            b'>' if idx > 0 && bytes[idx - 1] == b'-' => {}
            b'>' => depth += 1,
            b'<' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return symbol[..idx].strip_suffix("::");
                }
            }
            _ => {}
        }
    }
    None
}

/// Snapshot of a call stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace {
    frames: Vec<Frame>,
    raw: String,
}

fn frame_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+:\s+(\S.*)$").expect("frame regex is valid"))
}

impl StackTrace {
    /// Capture the current call stack regardless of `RUST_BACKTRACE`
    pub fn capture() -> Self {
        Self::parse(&Backtrace::force_capture().to_string())
    }

    /// Parse the textual form of a `std::backtrace::Backtrace`
    pub fn parse(text: &str) -> Self {
        let frames = text
            .lines()
            .filter_map(|line| frame_line_regex().captures(line))
            .map(|caps| Frame::new(caps[1].trim()))
            .collect();

        Self {
            frames,
            raw: text.to_string(),
        }
    }

    /// Build a trace from symbols, innermost first
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let frames: Vec<Frame> = symbols.into_iter().map(Frame::new).collect();
        let raw = frames
            .iter()
            .enumerate()
            .map(|(i, frame)| format!("{:4}: {}", i, frame.symbol()))
            .collect::<Vec<_>>()
            .join("\n");

        Self { frames, raw }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Text as printed by the backtrace
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl std::fmt::Display for StackTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
