// src/sheet/envelope.rs
//
// The gviz export wraps its JSON in a JSONP callback, e.g.
//   /*O_o*/
//   google.visualization.Query.setResponse({"version":"0.6",...});

/// Why an envelope could not be stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeError {
    NoOpenParen,
    NoCloseBrace,
    CloseBeforeOpen,
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvelopeError::NoOpenParen => write!(f, "no '(' in payload"),
            EnvelopeError::NoCloseBrace => write!(f, "no '}}' in payload"),
            EnvelopeError::CloseBeforeOpen => write!(f, "last '}}' precedes first '('"),
        }
    }
}

/// Return the text from just after the first `(` through the last `}` inclusive.
///
/// This is a textual heuristic, not a grammar: a `(` inside the prefix or a `}`
/// inside the trailer moves the cut points.
pub fn strip_envelope(text: &str) -> Result<&str, EnvelopeError> {
    let open = text.find('(').ok_or(EnvelopeError::NoOpenParen)?;
    let close = text.rfind('}').ok_or(EnvelopeError::NoCloseBrace)?;
    if close < open {
        return Err(EnvelopeError::CloseBeforeOpen);
    }
    // both delimiters are ASCII, so these are char boundaries
    Ok(&text[open + 1..=close])
}
