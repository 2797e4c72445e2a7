//! Bounded reads of an HTTP response body.
//!
//! A pooled connection can only be reused once its previous response has
//! been read to the end.  [`read_capped`] keeps the first `buf.len()`
//! bytes, discards up to [`DRAIN_LIMIT`] more, and reports whether the
//! body ended.  When it did not, the caller must drop the connection.

/// Bytes discarded past the kept prefix before giving up on the body.
pub const DRAIN_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    /// Bytes kept in the caller's buffer.
    pub len: usize,
    /// The body was read to its end.
    pub complete: bool,
}

/// Read a body through `read` (a `Read::read`-style call returning 0 at
/// end of body).
pub fn read_capped<E>(
    buf: &mut [u8],
    mut read: impl FnMut(&mut [u8]) -> Result<usize, E>,
) -> Result<Body, E> {
    let mut len = 0;
    while len < buf.len() {
        let n = read(&mut buf[len..])?;
        if n == 0 {
            return Ok(Body { len, complete: true });
        }
        len += n;
    }

    let mut scratch = [0u8; 64];
    let mut drained = 0;
    while drained <= DRAIN_LIMIT {
        let n = read(&mut scratch)?;
        if n == 0 {
            return Ok(Body { len, complete: true });
        }
        drained += n;
    }
    Ok(Body { len, complete: false })
}
