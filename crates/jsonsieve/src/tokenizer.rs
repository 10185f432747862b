//! Character-level tokenizer for the streaming parser.
//!
//! The tokenizer is a finite state machine over a ring of unread characters.
//! Chunks are appended with [`Tokenizer::feed`] and complete tokens are
//! pulled with [`Tokenizer::next_token`]; when the ring runs dry mid-token
//! the lexical state simply persists until the next chunk arrives, so the
//! token stream is identical no matter how the input is split.
//!
//! Because a number has no terminating character of its own, a trailing
//! number is only finalized once [`Tokenizer::close`] marks the end of the
//! stream.
use core::mem;

use crate::buffer::Buffer;
use crate::error::{ErrorKind, Location, ParseError};
use crate::escape_buffer::UnicodeEscapeBuffer;
use crate::literal_buffer::{ExpectedLiteralBuffer, Step};

/// RFC 7464 record separator, ignored between documents in multi mode.
pub(crate) const RECORD_SEPARATOR: char = '\u{1E}';

/// A complete lexical token.
///
/// Numbers travel as raw text; the builder converts them on acceptance.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    True,
    False,
    Null,
    String(String),
    Number(String),
}

impl Token {
    /// Short rendering for grammar error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::LeftBrace => "'{'".into(),
            Token::RightBrace => "'}'".into(),
            Token::LeftBracket => "'['".into(),
            Token::RightBracket => "']'".into(),
            Token::Colon => "':'".into(),
            Token::Comma => "','".into(),
            Token::True => "'true'".into(),
            Token::False => "'false'".into(),
            Token::Null => "'null'".into(),
            Token::String(s) => format!("string {s:?}"),
            Token::Number(n) => format!("number {n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenizerState {
    Default,
    String,
    StringEscape,
    StringUnicode,
    Sign,
    Zero,
    Integer,
    Point,
    Fraction,
    Exponent,
    ExponentSign,
    ExponentInteger,
    Literal,
}

impl TokenizerState {
    fn name(self) -> &'static str {
        match self {
            TokenizerState::Default => "Default",
            TokenizerState::String => "String",
            TokenizerState::StringEscape => "StringEscape",
            TokenizerState::StringUnicode => "StringUnicode",
            TokenizerState::Sign => "Sign",
            TokenizerState::Zero => "Zero",
            TokenizerState::Integer => "Integer",
            TokenizerState::Point => "Point",
            TokenizerState::Fraction => "Fraction",
            TokenizerState::Exponent => "Exponent",
            TokenizerState::ExponentSign => "ExponentSign",
            TokenizerState::ExponentInteger => "ExponentInteger",
            TokenizerState::Literal => "Literal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Peeked {
    /// The ring is empty but the stream is still open.
    Empty,
    Char(char),
    /// The ring is empty and the stream is closed.
    EndOfInput,
}

/// The streaming tokenizer.
#[derive(Debug)]
pub(crate) struct Tokenizer {
    source: Buffer,
    end_of_input: bool,

    /// Current *global* character position.
    position: usize,
    line: usize,
    column: usize,

    state: TokenizerState,
    /// Scratch buffer reused for strings and numbers.
    buffer: String,
    unicode: UnicodeEscapeBuffer,
    pending_high_surrogate: Option<u16>,
    expected_literal: ExpectedLiteralBuffer,

    /// Structural nesting depth, tracked for the record-separator and
    /// trailing-data rules, which apply only between top-level values.
    depth: usize,
    /// A complete top-level value has been produced.
    seen_value: bool,
    multi: bool,
}

impl Tokenizer {
    pub(crate) fn new(multi: bool) -> Self {
        Self {
            source: Buffer::new(),
            end_of_input: false,
            position: 0,
            line: 1,
            column: 1,
            state: TokenizerState::Default,
            buffer: String::new(),
            unicode: UnicodeEscapeBuffer::new(),
            pending_high_surrogate: None,
            expected_literal: ExpectedLiteralBuffer::none(),
            depth: 0,
            seen_value: false,
            multi,
        }
    }

    /// Appends a chunk of input.
    pub(crate) fn feed(&mut self, text: &str) {
        self.source.push(text);
    }

    /// Marks the end of input; a trailing number will be finalized on the
    /// next [`next_token`](Self::next_token) call.
    pub(crate) fn close(&mut self) {
        self.end_of_input = true;
    }

    pub(crate) fn location(&self) -> Location {
        Location {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    #[inline]
    fn peek(&self) -> Peeked {
        if let Some(c) = self.source.peek() {
            Peeked::Char(c)
        } else if self.end_of_input {
            Peeked::EndOfInput
        } else {
            Peeked::Empty
        }
    }

    #[inline]
    fn advance(&mut self) {
        if let Some(c) = self.source.next() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::at(self.location(), kind)
    }

    fn unexpected(&self, found: char) -> ParseError {
        self.error(ErrorKind::UnexpectedCharacter {
            found,
            state: self.state.name(),
        })
    }

    fn unexpected_end(&self) -> ParseError {
        self.error(ErrorKind::UnexpectedEndOfInput {
            state: self.state.name(),
        })
    }

    /// Begins a number token with its first character.
    fn begin_number(&mut self, c: char, state: TokenizerState) {
        self.buffer.clear();
        self.buffer.push(c);
        self.advance();
        self.state = state;
    }

    /// Ends the current number token. The delimiting character, if any, is
    /// left in the ring to be re-processed in the `Default` state.
    fn finalize_number(&mut self) -> Token {
        self.state = TokenizerState::Default;
        if self.depth == 0 {
            self.seen_value = true;
        }
        Token::Number(mem::take(&mut self.buffer))
    }

    /// Consumes a run of ASCII digits in one pass.
    fn copy_digits(&mut self) {
        let copied = self
            .source
            .copy_while(&mut self.buffer, |d| d.is_ascii_digit());
        self.column += copied;
        self.position += copied;
    }

    /// Flushes a pending high surrogate that was not followed by a low
    /// surrogate. Rust strings cannot hold an unpaired half, so it becomes
    /// U+FFFD.
    fn flush_pending_surrogate(&mut self) {
        if self.pending_high_surrogate.take().is_some() {
            self.buffer.push(char::REPLACEMENT_CHARACTER);
        }
    }

    fn push_escaped(&mut self, c: char) {
        self.flush_pending_surrogate();
        self.buffer.push(c);
        self.state = TokenizerState::String;
    }

    /// Resolves one decoded `\uXXXX` code unit, pairing surrogate halves.
    fn push_code_unit(&mut self, unit: u16) {
        match (self.pending_high_surrogate.take(), unit) {
            (Some(hi), lo @ 0xDC00..=0xDFFF) => {
                let combined =
                    0x10000 + ((u32::from(hi) - 0xD800) << 10) + (u32::from(lo) - 0xDC00);
                self.buffer
                    .push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            (pending, hi @ 0xD800..=0xDBFF) => {
                if pending.is_some() {
                    self.buffer.push(char::REPLACEMENT_CHARACTER);
                }
                self.pending_high_surrogate = Some(hi);
            }
            (pending, unit) => {
                if pending.is_some() {
                    self.buffer.push(char::REPLACEMENT_CHARACTER);
                }
                self.buffer
                    .push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
        self.state = TokenizerState::String;
    }

    fn finish_string(&mut self) -> Token {
        self.flush_pending_surrogate();
        self.state = TokenizerState::Default;
        if self.depth == 0 {
            self.seen_value = true;
        }
        Token::String(mem::take(&mut self.buffer))
    }

    /// Pulls the next complete token.
    ///
    /// Returns `Ok(None)` when the available input is exhausted: either more
    /// chunks are needed, or the stream is closed and fully drained.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        loop {
            let next = self.peek();
            match self.state {
                TokenizerState::Default => match next {
                    Peeked::Empty | Peeked::EndOfInput => return Ok(None),
                    Peeked::Char(c) => {
                        if self.depth == 0 {
                            if self.multi && c == RECORD_SEPARATOR {
                                self.advance();
                                continue;
                            }
                            if !self.multi
                                && self.seen_value
                                && !matches!(c, ' ' | '\t' | '\n' | '\r')
                            {
                                return Err(self.error(ErrorKind::TrailingData(c)));
                            }
                        }
                        match c {
                            ' ' | '\t' | '\n' | '\r' => self.advance(),
                            '{' => {
                                self.advance();
                                self.depth += 1;
                                return Ok(Some(Token::LeftBrace));
                            }
                            '[' => {
                                self.advance();
                                self.depth += 1;
                                return Ok(Some(Token::LeftBracket));
                            }
                            '}' | ']' => {
                                self.advance();
                                if self.depth <= 1 {
                                    self.depth = 0;
                                    self.seen_value = true;
                                } else {
                                    self.depth -= 1;
                                }
                                return Ok(Some(if c == '}' {
                                    Token::RightBrace
                                } else {
                                    Token::RightBracket
                                }));
                            }
                            ':' => {
                                self.advance();
                                return Ok(Some(Token::Colon));
                            }
                            ',' => {
                                self.advance();
                                return Ok(Some(Token::Comma));
                            }
                            '"' => {
                                self.advance();
                                self.buffer.clear();
                                self.state = TokenizerState::String;
                            }
                            '-' => self.begin_number(c, TokenizerState::Sign),
                            '0' => self.begin_number(c, TokenizerState::Zero),
                            '1'..='9' => self.begin_number(c, TokenizerState::Integer),
                            't' | 'f' | 'n' => {
                                self.advance();
                                self.expected_literal = ExpectedLiteralBuffer::new(c);
                                self.state = TokenizerState::Literal;
                            }
                            _ => return Err(self.unexpected(c)),
                        }
                    }
                },

                TokenizerState::String => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Err(self.unexpected_end()),
                    Peeked::Char('"') => {
                        self.advance();
                        return Ok(Some(self.finish_string()));
                    }
                    Peeked::Char('\\') => {
                        self.advance();
                        self.state = TokenizerState::StringEscape;
                    }
                    Peeked::Char(c) if (c as u32) <= 0x1F => {
                        return Err(self.unexpected(c));
                    }
                    Peeked::Char(_) => {
                        self.flush_pending_surrogate();
                        // Fast path: copy consecutive plain characters in one
                        // pass. The predicate rejects newlines (< 0x20), so
                        // only the column moves.
                        let copied = self.source.copy_while(&mut self.buffer, |ch| {
                            ch != '\\' && ch != '"' && ch >= '\u{20}'
                        });
                        self.column += copied;
                        self.position += copied;
                    }
                },

                TokenizerState::StringEscape => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Err(self.unexpected_end()),
                    Peeked::Char(c) => match c {
                        '"' | '\\' | '/' => {
                            self.advance();
                            self.push_escaped(c);
                        }
                        'b' => {
                            self.advance();
                            self.push_escaped('\u{0008}');
                        }
                        'f' => {
                            self.advance();
                            self.push_escaped('\u{000C}');
                        }
                        'n' => {
                            self.advance();
                            self.push_escaped('\n');
                        }
                        'r' => {
                            self.advance();
                            self.push_escaped('\r');
                        }
                        't' => {
                            self.advance();
                            self.push_escaped('\t');
                        }
                        'u' => {
                            self.advance();
                            self.state = TokenizerState::StringUnicode;
                        }
                        other => return Err(self.error(ErrorKind::InvalidEscapeCharacter(other))),
                    },
                },

                TokenizerState::StringUnicode => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Err(self.unexpected_end()),
                    Peeked::Char(c) if c.is_ascii_hexdigit() => {
                        self.advance();
                        if let Some(unit) = self.unicode.feed(c) {
                            self.push_code_unit(unit);
                        }
                    }
                    Peeked::Char(c) => return Err(self.unexpected(c)),
                },

                TokenizerState::Sign => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Err(self.unexpected_end()),
                    Peeked::Char(c @ '0') => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::Zero;
                    }
                    Peeked::Char(c) if c.is_ascii_digit() => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::Integer;
                    }
                    Peeked::Char(c) => return Err(self.unexpected(c)),
                },

                TokenizerState::Zero => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Ok(Some(self.finalize_number())),
                    Peeked::Char(c) if c.is_ascii_digit() => {
                        return Err(self.error(ErrorKind::LeadingZero));
                    }
                    Peeked::Char(c @ '.') => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::Point;
                    }
                    Peeked::Char(c @ ('e' | 'E')) => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::Exponent;
                    }
                    Peeked::Char(_) => return Ok(Some(self.finalize_number())),
                },

                TokenizerState::Integer => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Ok(Some(self.finalize_number())),
                    Peeked::Char(c @ '.') => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::Point;
                    }
                    Peeked::Char(c @ ('e' | 'E')) => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::Exponent;
                    }
                    Peeked::Char(c) if c.is_ascii_digit() => {
                        self.advance();
                        self.buffer.push(c);
                        self.copy_digits();
                    }
                    Peeked::Char(_) => return Ok(Some(self.finalize_number())),
                },

                TokenizerState::Point => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Err(self.unexpected_end()),
                    Peeked::Char(c) if c.is_ascii_digit() => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::Fraction;
                        self.copy_digits();
                    }
                    Peeked::Char(c) => return Err(self.unexpected(c)),
                },

                TokenizerState::Fraction => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Ok(Some(self.finalize_number())),
                    Peeked::Char(c @ ('e' | 'E')) => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::Exponent;
                    }
                    Peeked::Char(c) if c.is_ascii_digit() => {
                        self.advance();
                        self.buffer.push(c);
                        self.copy_digits();
                    }
                    Peeked::Char(_) => return Ok(Some(self.finalize_number())),
                },

                TokenizerState::Exponent => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Err(self.unexpected_end()),
                    Peeked::Char(c @ ('+' | '-')) => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::ExponentSign;
                    }
                    Peeked::Char(c) if c.is_ascii_digit() => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::ExponentInteger;
                        self.copy_digits();
                    }
                    Peeked::Char(c) => return Err(self.unexpected(c)),
                },

                TokenizerState::ExponentSign => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Err(self.unexpected_end()),
                    Peeked::Char(c) if c.is_ascii_digit() => {
                        self.advance();
                        self.buffer.push(c);
                        self.state = TokenizerState::ExponentInteger;
                        self.copy_digits();
                    }
                    Peeked::Char(c) => return Err(self.unexpected(c)),
                },

                TokenizerState::ExponentInteger => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Ok(Some(self.finalize_number())),
                    Peeked::Char(c) if c.is_ascii_digit() => {
                        self.advance();
                        self.buffer.push(c);
                        self.copy_digits();
                    }
                    Peeked::Char(_) => return Ok(Some(self.finalize_number())),
                },

                TokenizerState::Literal => match next {
                    Peeked::Empty => return Ok(None),
                    Peeked::EndOfInput => return Err(self.unexpected_end()),
                    Peeked::Char(c) => match self.expected_literal.step(c) {
                        Step::NeedMore => self.advance(),
                        Step::Done(tok) => {
                            self.advance();
                            self.state = TokenizerState::Default;
                            if self.depth == 0 {
                                self.seen_value = true;
                            }
                            return Ok(Some(tok));
                        }
                        Step::Reject => return Err(self.unexpected(c)),
                    },
                },
            }
        }
    }
}
