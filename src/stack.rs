//! Stack growth for the recursive passes. Lexing nested interpolation,
//! parsing, visiting and printing all recurse once per nesting level.

/// Remaining stack below which a recursive step moves to a new segment.
const RED_ZONE: usize = 128 * 1024;
/// Size of each new segment.
const SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, switching to a fresh stack segment first if the current one is
/// nearly exhausted.
#[inline]
pub(crate) fn ensure<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}
