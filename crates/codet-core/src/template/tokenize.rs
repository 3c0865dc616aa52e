//! Tokenization for template sources
//!
//! Splits the source into delimiter, line break and character tokens in a
//! single forward pass.

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<%` outside a code block
    CodeBlockStart,

    /// `%>` inside a code block
    CodeBlockEnd,

    /// `\n`, `\r`, `\r\n` or `\n\r`
    LineBreak,

    /// Any other single character
    Character,

    /// Past the end of the source. Repeats forever.
    End,
}

/// A single token with its source coordinates
///
/// `text` borrows from the source, so a token costs no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token classification
    pub kind: TokenKind,
    /// Byte offset of the token in the source (0-based)
    pub position: usize,
    /// Line the token starts on (1-based)
    pub line: usize,
    /// Exact source text of the token; empty for [`TokenKind::End`]
    pub text: &'a str,
}

impl Token<'_> {
    /// True for a `Character` token whose text is exactly `c`
    pub fn is_char(&self, c: char) -> bool {
        self.kind == TokenKind::Character && self.text.len() == c.len_utf8() && self.text.starts_with(c)
    }
}

/// Tokenization state machine
///
/// # State Transitions
///
/// ```text
/// Outside ──<%──> InsideBlock ──%>──> Outside
///   │                 │
///   │ (%> is plain)   │ (<% is plain)
///   └─────────────────┘
/// ```
///
/// A `<%` seen while already inside a block is two plain characters, so code
/// blocks can never nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Scanning literal text
    Outside,
    /// Scanning the interior of a `<% ... %>` block
    InsideBlock,
}

/// Lazy token sequence over a template source
///
/// # Example
///
/// ```
/// use codet_core::template::{TokenKind, Tokenizer};
///
/// let mut tokens = Tokenizer::new("a<%b%>");
/// assert_eq!(tokens.next_token().kind, TokenKind::Character);
/// assert_eq!(tokens.next_token().kind, TokenKind::CodeBlockStart);
/// assert_eq!(tokens.peek().text, "b");
/// assert!(tokens.has_more());
/// ```
pub struct Tokenizer<'a> {
    source: &'a str,
    /// Current byte position
    pos: usize,
    /// Current line number
    line: usize,
    state: ScanState,
    /// Lookahead, always populated
    next: Token<'a>,
    /// Set once the iterator has yielded `End`
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer positioned at the start of `source`
    pub fn new(source: &'a str) -> Self {
        let mut tokenizer = Self {
            source,
            pos: 0,
            line: 1,
            state: ScanState::Outside,
            next: Token {
                kind: TokenKind::End,
                position: 0,
                line: 1,
                text: "",
            },
            finished: false,
        };
        tokenizer.next = tokenizer.scan_token();
        tokenizer
    }

    /// The next token, without consuming it
    pub fn peek(&self) -> Token<'a> {
        self.next
    }

    /// Consume and return the next token
    pub fn next_token(&mut self) -> Token<'a> {
        let current = self.next;
        self.next = self.scan_token();
        current
    }

    /// True while the next token is not [`TokenKind::End`]
    pub fn has_more(&self) -> bool {
        self.next.kind != TokenKind::End
    }

    /// Current scanner state
    pub fn state(&self) -> ScanState {
        self.state
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token<'a> {
        let token = Token {
            kind,
            position: self.pos,
            line: self.line,
            text: &self.source[self.pos..self.pos + len],
        };
        self.pos += len;
        token
    }

    /// Scan one token at the current position
    fn scan_token(&mut self) -> Token<'a> {
        let rest = &self.source[self.pos..];
        let mut chars = rest.chars();

        let Some(current) = chars.next() else {
            return Token {
                kind: TokenKind::End,
                position: self.source.len(),
                line: self.line,
                text: "",
            };
        };
        let following = chars.next();

        match (current, following, self.state) {
            ('<', Some('%'), ScanState::Outside) => {
                self.state = ScanState::InsideBlock;
                self.emit(TokenKind::CodeBlockStart, 2)
            }
            ('%', Some('>'), ScanState::InsideBlock) => {
                self.state = ScanState::Outside;
                self.emit(TokenKind::CodeBlockEnd, 2)
            }
            ('\r', Some('\n'), _) | ('\n', Some('\r'), _) => {
                let token = self.emit(TokenKind::LineBreak, 2);
                self.line += 1;
                token
            }
            ('\r', _, _) | ('\n', _, _) => {
                let token = self.emit(TokenKind::LineBreak, 1);
                self.line += 1;
                token
            }
            (c, _, _) => self.emit(TokenKind::Character, c.len_utf8()),
        }
    }
}

/// Yields every token up to and including the first `End`, then stops
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if token.kind == TokenKind::End {
            self.finished = true;
        }
        Some(token)
    }
}
