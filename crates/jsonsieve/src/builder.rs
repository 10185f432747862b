//! Grammar-level value builder.
//!
//! The builder consumes [`Token`]s and maintains the stack of in-progress
//! containers. Subtrees are built *detached*: a completed value is handed to
//! the caller inside a [`BuildEvent::ValueCompleted`] event, and only
//! re-attached to its parent container via [`ValueBuilder::retain`] when the
//! match engine decides some pattern still needs it. Values nobody needs are
//! simply dropped, which is what bounds memory below document size.
use crate::error::{ErrorKind, Location, ParseError};
use crate::tokenizer::Token;
use crate::value::{Map, Value};

/// Container kind of an open frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Object,
    Array,
}

/// The slot a container is currently filling: an object key or an array
/// index, keyed by [`Mode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SlotKey {
    Key(String),
    Index(usize),
}

/// One step of an observed path, as seen by the match engine.
///
/// Array index identity is not exposed to matching, so array elements all
/// observe as [`PathStep::Elem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathStep {
    Key(String),
    Elem,
}

/// Grammar state; drives token legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    ExpectValue,
    ExpectValueAfterComma,
    ExpectKey,
    ExpectKeyAfterComma,
    ExpectColon,
    ExpectCommaOrClose,
}

impl ParserState {
    fn name(self) -> &'static str {
        match self {
            ParserState::ExpectValue => "ExpectValue",
            ParserState::ExpectValueAfterComma => "ExpectValueAfterComma",
            ParserState::ExpectKey => "ExpectKey",
            ParserState::ExpectKeyAfterComma => "ExpectKeyAfterComma",
            ParserState::ExpectColon => "ExpectColon",
            ParserState::ExpectCommaOrClose => "ExpectCommaOrClose",
        }
    }
}

/// Saved registers of a parent container while a child is open.
///
/// Index 0 of the stack is the synthetic root frame (all fields `None`).
#[derive(Debug)]
struct Frame {
    key: Option<SlotKey>,
    value: Option<Value>,
    mode: Option<Mode>,
}

/// Structural event raised by [`ValueBuilder::accept`].
///
/// Events are delivered in document order; a closing brace or bracket raises
/// `ValueCompleted` for the container *before* the matching `Popped`.
#[derive(Debug)]
pub(crate) enum BuildEvent {
    /// A container opened; the stack grew by one frame.
    Pushed { mode: Mode },
    /// An object member key was bound at the deepest slot.
    KeySet { key: String },
    /// A container closed; `depth` is the number of still-open containers.
    Popped { depth: usize },
    /// A value (primitive or container) finished at the current position.
    ValueCompleted { value: Value, path: Vec<PathStep> },
}

/// The stack-based value builder.
#[derive(Debug)]
pub(crate) struct ValueBuilder {
    state: ParserState,
    mode: Option<Mode>,
    key: Option<SlotKey>,
    /// The container currently being filled, detached from its parent.
    value: Option<Value>,
    stack: Vec<Frame>,
    /// Completed top-level values.
    documents: usize,
}

impl ValueBuilder {
    pub(crate) fn new() -> Self {
        Self {
            state: ParserState::ExpectValue,
            mode: None,
            key: None,
            value: None,
            stack: Vec::new(),
            documents: 0,
        }
    }

    /// Number of completed top-level values.
    pub(crate) fn documents(&self) -> usize {
        self.documents
    }

    /// Serialized size of every value still reachable from the stack and the
    /// current registers. Test hook for the pruning bound.
    pub(crate) fn retained_bytes(&self) -> usize {
        let frames = self
            .stack
            .iter()
            .filter_map(|f| f.value.as_ref())
            .map(|v| v.to_string().len())
            .sum::<usize>();
        frames
            + self
                .value
                .as_ref()
                .map_or(0, |v| v.to_string().len())
    }

    /// Re-attaches a completed value at the slot it was parsed from. Called
    /// by the driver when some pattern still needs the surrounding subtree.
    pub(crate) fn retain(&mut self, v: Value) {
        match (&mut self.value, &self.key) {
            (Some(Value::Object(map)), Some(SlotKey::Key(k))) => {
                map.insert(k.clone(), v);
            }
            (Some(Value::Array(arr)), Some(SlotKey::Index(i))) => {
                let i = *i;
                if i >= arr.len() {
                    arr.resize(i + 1, Value::Null);
                }
                arr[i] = v;
            }
            // Top level, or a slot that no longer exists: nothing to attach
            // into, the caller keeps ownership via the emitted record.
            _ => {}
        }
    }

    /// Observed path of the value currently being completed.
    ///
    /// Frames beyond the synthetic root contribute one step each: the slot of
    /// the child container they were saved for. `with_current` appends the
    /// step for the current slot (primitives complete *at* the current slot;
    /// containers complete as the slot saved in their parent frame).
    fn snapshot_path(&self, with_current: bool) -> Vec<PathStep> {
        let mut path: Vec<PathStep> = self
            .stack
            .iter()
            .skip(1)
            .map(Self::frame_step)
            .collect();
        if with_current {
            if let Some(step) = self.current_step() {
                path.push(step);
            }
        }
        path
    }

    fn frame_step(frame: &Frame) -> PathStep {
        match (frame.mode, &frame.key) {
            (Some(Mode::Object), Some(SlotKey::Key(k))) => PathStep::Key(k.clone()),
            (Some(Mode::Array), _) => PathStep::Elem,
            // Frames beyond the root always carry a mode and, in object
            // mode, a bound key.
            _ => unreachable!("malformed frame in stack"),
        }
    }

    fn current_step(&self) -> Option<PathStep> {
        match (self.mode, &self.key) {
            (Some(Mode::Object), Some(SlotKey::Key(k))) => Some(PathStep::Key(k.clone())),
            (Some(Mode::Array), _) => Some(PathStep::Elem),
            _ => None,
        }
    }

    fn grammar_error(&self, token: &Token, at: Location) -> ParseError {
        ParseError::at(
            at,
            ErrorKind::UnexpectedToken {
                token: token.describe(),
                state: self.state.name(),
            },
        )
    }

    fn push_container(&mut self, mode: Mode, events: &mut Vec<BuildEvent>) {
        self.stack.push(Frame {
            key: self.key.take(),
            value: self.value.take(),
            mode: self.mode,
        });
        self.value = Some(match mode {
            Mode::Object => Value::Object(Map::new()),
            Mode::Array => Value::Array(Vec::new()),
        });
        self.mode = Some(mode);
        self.key = match mode {
            Mode::Object => None,
            Mode::Array => Some(SlotKey::Index(0)),
        };
        self.state = match mode {
            Mode::Object => ParserState::ExpectKey,
            Mode::Array => ParserState::ExpectValue,
        };
        events.push(BuildEvent::Pushed { mode });
    }

    fn close_container(&mut self, events: &mut Vec<BuildEvent>) {
        // The closing container's own binding is the slot saved in its
        // parent frame, so the path is exactly the frame steps.
        let path = self.snapshot_path(false);
        let value = self.value.take().unwrap_or(Value::Null);
        events.push(BuildEvent::ValueCompleted { value, path });

        let frame = self.stack.pop().unwrap_or(Frame {
            key: None,
            value: None,
            mode: None,
        });
        self.key = frame.key;
        self.value = frame.value;
        self.mode = frame.mode;
        if self.mode.is_none() {
            // Top level again: ready for another document in multi mode.
            self.state = ParserState::ExpectValue;
            self.documents += 1;
        } else {
            self.state = ParserState::ExpectCommaOrClose;
        }
        events.push(BuildEvent::Popped {
            depth: self.stack.len(),
        });
    }

    fn complete_primitive(&mut self, value: Value, events: &mut Vec<BuildEvent>) {
        let path = self.snapshot_path(true);
        events.push(BuildEvent::ValueCompleted { value, path });
        if self.mode.is_none() {
            self.documents += 1;
            self.state = ParserState::ExpectValue;
        } else {
            self.state = ParserState::ExpectCommaOrClose;
        }
    }

    fn primitive_value(token: &Token, at: Location) -> Result<Option<Value>, ParseError> {
        Ok(Some(match token {
            Token::Null => Value::Null,
            Token::True => Value::Boolean(true),
            Token::False => Value::Boolean(false),
            Token::String(s) => Value::String(s.clone()),
            Token::Number(text) => {
                let n = text.parse::<f64>().map_err(|_| {
                    ParseError::at(at, ErrorKind::MalformedNumber(text.clone()))
                })?;
                Value::Number(n)
            }
            _ => return Ok(None),
        }))
    }

    /// Accepts one token, appending any structural events it produces.
    pub(crate) fn accept(
        &mut self,
        token: Token,
        at: Location,
        events: &mut Vec<BuildEvent>,
    ) -> Result<(), ParseError> {
        match self.state {
            ParserState::ExpectValue | ParserState::ExpectValueAfterComma => {
                if let Some(v) = Self::primitive_value(&token, at)? {
                    self.complete_primitive(v, events);
                    return Ok(());
                }
                match token {
                    Token::LeftBrace => self.push_container(Mode::Object, events),
                    Token::LeftBracket => self.push_container(Mode::Array, events),
                    Token::RightBrace
                        if self.mode == Some(Mode::Object)
                            && self.state != ParserState::ExpectValueAfterComma =>
                    {
                        self.close_container(events);
                    }
                    Token::RightBracket
                        if self.mode == Some(Mode::Array)
                            && self.state != ParserState::ExpectValueAfterComma =>
                    {
                        self.close_container(events);
                    }
                    other => return Err(self.grammar_error(&other, at)),
                }
                Ok(())
            }

            ParserState::ExpectKey | ParserState::ExpectKeyAfterComma => match token {
                Token::String(key) => {
                    events.push(BuildEvent::KeySet { key: key.clone() });
                    self.key = Some(SlotKey::Key(key));
                    self.state = ParserState::ExpectColon;
                    Ok(())
                }
                Token::RightBrace if self.state == ParserState::ExpectKey => {
                    self.close_container(events);
                    Ok(())
                }
                other => Err(self.grammar_error(&other, at)),
            },

            ParserState::ExpectColon => match token {
                Token::Colon => {
                    self.state = ParserState::ExpectValue;
                    Ok(())
                }
                other => Err(self.grammar_error(&other, at)),
            },

            ParserState::ExpectCommaOrClose => match token {
                Token::Comma => {
                    match self.mode {
                        Some(Mode::Array) => {
                            if let Some(SlotKey::Index(i)) = &mut self.key {
                                *i += 1;
                            }
                            self.state = ParserState::ExpectValueAfterComma;
                        }
                        Some(Mode::Object) => {
                            self.state = ParserState::ExpectKeyAfterComma;
                        }
                        None => return Err(self.grammar_error(&Token::Comma, at)),
                    }
                    Ok(())
                }
                Token::RightBrace if self.mode == Some(Mode::Object) => {
                    self.close_container(events);
                    Ok(())
                }
                Token::RightBracket if self.mode == Some(Mode::Array) => {
                    self.close_container(events);
                    Ok(())
                }
                other => Err(self.grammar_error(&other, at)),
            },
        }
    }

    /// Validates termination once the input is fully consumed.
    pub(crate) fn check_end(&self, at: Location) -> Result<(), ParseError> {
        if self.mode.is_some() || !self.stack.is_empty() {
            return Err(ParseError::at(at, ErrorKind::UnterminatedContainer));
        }
        if self.documents == 0 {
            return Err(ParseError::at(at, ErrorKind::NoData));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location { position: 0, line: 1, column: 1 }
    }

    fn accept_all(builder: &mut ValueBuilder, tokens: Vec<Token>) -> Vec<BuildEvent> {
        let mut events = Vec::new();
        for tok in tokens {
            builder.accept(tok, loc(), &mut events).unwrap();
        }
        events
    }

    #[test]
    fn object_member_paths() {
        let mut b = ValueBuilder::new();
        let events = accept_all(
            &mut b,
            vec![
                Token::LeftBrace,
                Token::String("a".into()),
                Token::Colon,
                Token::Number("1".into()),
                Token::RightBrace,
            ],
        );
        let paths: Vec<Vec<PathStep>> = events
            .iter()
            .filter_map(|e| match e {
                BuildEvent::ValueCompleted { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            paths,
            vec![vec![PathStep::Key("a".into())], vec![]],
        );
        assert_eq!(b.documents(), 1);
    }

    #[test]
    fn array_elements_observe_as_elem() {
        let mut b = ValueBuilder::new();
        let events = accept_all(
            &mut b,
            vec![
                Token::LeftBracket,
                Token::Number("1".into()),
                Token::Comma,
                Token::Number("2".into()),
                Token::RightBracket,
            ],
        );
        let paths: Vec<Vec<PathStep>> = events
            .iter()
            .filter_map(|e| match e {
                BuildEvent::ValueCompleted { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            paths,
            vec![vec![PathStep::Elem], vec![PathStep::Elem], vec![]],
        );
    }

    #[test]
    fn comma_before_close_is_rejected() {
        let mut b = ValueBuilder::new();
        let mut events = Vec::new();
        b.accept(Token::LeftBracket, loc(), &mut events).unwrap();
        b.accept(Token::Number("1".into()), loc(), &mut events).unwrap();
        b.accept(Token::Comma, loc(), &mut events).unwrap();
        let err = b.accept(Token::RightBracket, loc(), &mut events).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn retained_values_attach_in_order() {
        let mut b = ValueBuilder::new();
        let mut events = Vec::new();
        b.accept(Token::LeftBracket, loc(), &mut events).unwrap();
        b.accept(Token::Number("1".into()), loc(), &mut events).unwrap();
        b.retain(Value::Number(1.0));
        b.accept(Token::Comma, loc(), &mut events).unwrap();
        b.accept(Token::Number("2".into()), loc(), &mut events).unwrap();
        b.retain(Value::Number(2.0));
        events.clear();
        b.accept(Token::RightBracket, loc(), &mut events).unwrap();
        let Some(BuildEvent::ValueCompleted { value, .. }) = events.first() else {
            panic!("expected a completed value");
        };
        assert_eq!(
            *value,
            Value::Array(vec![Value::Number(1.0), Value::Number(2.0)])
        );
    }
}
