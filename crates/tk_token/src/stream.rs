use thiserror::Error;

use crate::Token;

// -----------------------------------------------------------------------------
// Traits

/// A producer of tokens, driven one token per call.
///
/// Each call to [`step`](TokenSource::step) overwrites `token` with the next
/// token of the stream. The returned flag is `true` exactly when the token
/// just written completes the current top-level value.
///
/// After an error the source is abandoned; it is never valid to keep
/// stepping a failed source.
pub trait TokenSource {
    type Error;

    fn step(&mut self, token: &mut Token) -> Result<bool, Self::Error>;
}

/// A consumer of tokens, driven one token per call.
///
/// The returned flag is `true` exactly when `token` completes the current
/// top-level value.
pub trait TokenSink {
    type Error;

    fn step(&mut self, token: &Token) -> Result<bool, Self::Error>;
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
    type Error = T::Error;

    #[inline]
    fn step(&mut self, token: &mut Token) -> Result<bool, Self::Error> {
        (**self).step(token)
    }
}

impl<T: TokenSink + ?Sized> TokenSink for &mut T {
    type Error = T::Error;

    #[inline]
    fn step(&mut self, token: &Token) -> Result<bool, Self::Error> {
        (**self).step(token)
    }
}

// -----------------------------------------------------------------------------
// Pump

/// Error returned by [`pump`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PumpError<S, K> {
    #[error("token source failed: {0}")]
    Source(S),

    #[error("token sink failed: {0}")]
    Sink(K),

    #[error("token source finished while the sink still expected tokens")]
    SourceEndedEarly,

    #[error("token sink finished while the source still had tokens")]
    SinkEndedEarly,
}

/// Moves one complete value from `source` into `sink`.
///
/// Both sides must agree on where the value ends: if one reports done
/// while the other does not, the pump stops with
/// [`PumpError::SourceEndedEarly`] or [`PumpError::SinkEndedEarly`].
pub fn pump<S, K>(mut source: S, mut sink: K) -> Result<(), PumpError<S::Error, K::Error>>
where
    S: TokenSource,
    K: TokenSink,
{
    let mut token = Token::Null;
    loop {
        let source_done = source.step(&mut token).map_err(PumpError::Source)?;
        let sink_done = sink.step(&token).map_err(PumpError::Sink)?;
        match (source_done, sink_done) {
            (false, false) => {}
            (true, true) => return Ok(()),
            (true, false) => return Err(PumpError::SourceEndedEarly),
            (false, true) => return Err(PumpError::SinkEndedEarly),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
