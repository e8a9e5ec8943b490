use alloc::vec::Vec;

use crate::Error;

/// A destination for encoded bytes.
///
/// Flushing is left to the sink; the encoder only ever appends.
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

impl ByteSink for Vec<u8> {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        (**self).write_bytes(bytes)
    }
}

/// Adapts a [`std::io::Write`] into a [`ByteSink`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoSink<W>(pub W);

#[cfg(feature = "std")]
impl<W: std::io::Write> IoSink<W> {
    #[inline]
    pub fn into_inner(self) -> W {
        self.0
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write> ByteSink for IoSink<W> {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.0.write_all(bytes)?;
        Ok(())
    }
}
