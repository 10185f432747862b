//! Incremental matcher for the keyword literals `true`, `false` and `null`.
use crate::tokenizer::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    Null,
    True,
    False,
}

/// What happened after feeding one more character into the literal matcher?
pub(crate) enum Step {
    /// Character matched, but the literal is not finished yet.
    NeedMore,
    /// Character matched *and* it was the last byte of the literal.
    Done(Token),
    /// Character did **not** match the expected byte.
    Reject,
}

/// `None` means no literal is in flight; `Some` carries the remaining suffix
/// and the token to produce once it is consumed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer(Option<(&'static [u8], LiteralKind)>);

impl ExpectedLiteralBuffer {
    pub(crate) fn none() -> Self {
        ExpectedLiteralBuffer(None)
    }

    /// Starts matching after the *first* character (`n`, `t`, or `f`).
    pub(crate) fn new(first: char) -> Self {
        match first {
            'n' => ExpectedLiteralBuffer(Some((b"ull", LiteralKind::Null))),
            't' => ExpectedLiteralBuffer(Some((b"rue", LiteralKind::True))),
            'f' => ExpectedLiteralBuffer(Some((b"alse", LiteralKind::False))),
            _ => ExpectedLiteralBuffer::none(),
        }
    }

    /// Feeds the next input character and reports what to do.
    pub(crate) fn step(&mut self, c: char) -> Step {
        let Some((bytes, kind)) = self.0.take() else {
            return Step::Reject;
        };

        match bytes.split_first() {
            Some((&expected, rest)) if expected as char == c => {
                if rest.is_empty() {
                    Step::Done(match kind {
                        LiteralKind::Null => Token::Null,
                        LiteralKind::True => Token::True,
                        LiteralKind::False => Token::False,
                    })
                } else {
                    self.0 = Some((rest, kind));
                    Step::NeedMore
                }
            }
            _ => {
                // Mismatch; restore the state taken at the top so the caller
                // can report the literal it was expecting.
                self.0 = Some((bytes, kind));
                Step::Reject
            }
        }
    }
}
