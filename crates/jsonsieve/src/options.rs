//! Configuration options for the sieve parser.
use crate::engine::MatchStrategy;

/// Configuration options for [`SieveParser`](crate::SieveParser).
///
/// # Examples
///
/// ```rust
/// use jsonsieve::{MatchStrategy, SieveOptions};
///
/// let options = SieveOptions {
///     multi: true,
///     ..Default::default()
/// };
/// assert_eq!(options.strategy, MatchStrategy::Incremental);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SieveOptions {
    /// Whether to parse multiple JSON documents from a single stream.
    ///
    /// When `true`, the parser emits one completed top-level value per
    /// document and then resets to accept another. Documents may be
    /// separated by whitespace or by the U+001E record separator of
    /// [RFC 7464] JSON text sequences, or simply concatenated.
    ///
    /// When `false`, any non-whitespace content after the first completed
    /// top-level value is a terminal lexical error.
    ///
    /// # Default
    ///
    /// `false`
    ///
    /// [RFC 7464]: https://datatracker.ietf.org/doc/html/rfc7464
    pub multi: bool,

    /// How pattern matching is evaluated.
    ///
    /// Both strategies produce identical output; [`MatchStrategy::Incremental`]
    /// does less work per completed value on large pattern sets and deep
    /// documents.
    ///
    /// # Default
    ///
    /// [`MatchStrategy::Incremental`]
    pub strategy: MatchStrategy,
}
