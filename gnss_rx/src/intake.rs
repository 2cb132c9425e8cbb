//! Circular intake buffer shared between the byte source and the engine.
//!
//! The buffer is split once into a [`Producer`], which owns the write
//! cursor, and a [`Consumer`], which owns the scan and message-start
//! cursors. Cells and the write cursor are atomics, so the producer can
//! live in an interrupt handler while the consumer runs from the main loop.
//! No cursor is ever exposed as a reference into the array.

use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Read access to a run of bytes by position.
///
/// Implemented for plain slices and for [`Span`], so the sentence decoder
/// works the same on a buffered message and on a test vector.
pub trait ByteView {
    /// Returns the number of bytes in the view.
    fn len(&self) -> usize;

    /// Returns the byte at `index`, panicking if `index >= len()`.
    fn byte_at(&self, index: usize) -> u8;

    /// Returns whether the view is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteView for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn byte_at(&self, index: usize) -> u8 {
        self[index]
    }
}

/// Fixed-capacity ring of `N` bytes. One cell is always kept free, so at
/// most `N - 1` bytes can be outstanding.
///
/// `N` must exceed the longest message plus whatever arrives between two
/// polls; a sentence is reread from the ring after its `<LF>`.
pub struct Intake<const N: usize> {
    cells: [AtomicU8; N],
    write: AtomicUsize,
}

impl<const N: usize> Intake<N> {
    pub const fn new() -> Self {
        assert!(N >= 2, "intake needs room for at least one byte");
        Self {
            cells: [const { AtomicU8::new(0) }; N],
            write: AtomicUsize::new(0),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Hands out the two ends of the ring. Taking `&mut self` guarantees
    /// there is only ever one producer and one consumer.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let write = self.write.load(Ordering::Relaxed);
        let this: &Self = self;
        (
            Producer { intake: this },
            Consumer {
                intake: this,
                scan: write,
                start: write,
            },
        )
    }

    fn write_index(&self) -> usize {
        self.write.load(Ordering::Acquire)
    }

    fn cell(&self, index: usize) -> u8 {
        self.cells[index % N].load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for Intake<N> {
    fn default() -> Self {
        Self::new()
    }
}

const fn wrap_inc<const N: usize>(index: usize) -> usize {
    if index + 1 == N {
        0
    } else {
        index + 1
    }
}

/// Writing end of the ring, held by the byte source.
pub struct Producer<'a, const N: usize> {
    intake: &'a Intake<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// advance-write: stores `byte`, moves the write cursor and zeroes the
    /// cell it now points at, so stale data never reads as a marker.
    ///
    /// If the consumer has fallen a whole lap behind, unread bytes are
    /// overwritten silently.
    pub fn push(&mut self, byte: u8) {
        let write = self.intake.write.load(Ordering::Relaxed);
        let next = wrap_inc::<N>(write);
        self.intake.cells[write].store(byte, Ordering::Relaxed);
        self.intake.cells[next].store(0, Ordering::Relaxed);
        self.intake.write.store(next, Ordering::Release);
    }

    pub fn push_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }
}

/// Reading end of the ring, owned by the framing state machine.
pub struct Consumer<'a, const N: usize> {
    intake: &'a Intake<N>,
    scan: usize,
    start: usize,
}

impl<'a, const N: usize> Consumer<'a, N> {
    /// True when the scan cursor has caught up with the write cursor.
    pub fn is_empty(&self) -> bool {
        self.scan == self.intake.write_index()
    }

    /// Number of bytes written but not yet scanned.
    pub fn available(&self) -> usize {
        (self.intake.write_index() + N - self.scan) % N
    }

    /// Looks at the byte under the scan cursor without moving it.
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.intake.cell(self.scan))
        }
    }

    /// advance-scan. Does nothing on an empty buffer.
    pub fn advance_scan(&mut self) {
        if !self.is_empty() {
            self.scan = wrap_inc::<N>(self.scan);
        }
    }

    /// Returns the byte under the scan cursor and moves past it.
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.scan = wrap_inc::<N>(self.scan);
        Some(byte)
    }

    /// advance-message-start, up to the scan cursor. Everything behind it
    /// is released back to the producer.
    pub fn commit(&mut self) {
        self.start = self.scan;
    }

    /// Bytes between message-start and scan.
    pub fn pending_len(&self) -> usize {
        (self.scan + N - self.start) % N
    }

    /// The message currently being scanned, [message-start, scan).
    pub fn span(&self) -> Span<'_, N> {
        Span {
            intake: self.intake,
            start: self.start,
            len: self.pending_len(),
        }
    }
}

/// Read-only window onto the ring that hides the wrap boundary.
#[derive(Clone, Copy)]
pub struct Span<'a, const N: usize> {
    intake: &'a Intake<N>,
    start: usize,
    len: usize,
}

impl<const N: usize> ByteView for Span<'_, N> {
    fn len(&self) -> usize {
        self.len
    }

    fn byte_at(&self, index: usize) -> u8 {
        assert!(
            index < self.len,
            "index out of bounds: the len is {} but the index is {}",
            self.len,
            index
        );
        self.intake.cell(self.start + index)
    }
}

impl<const N: usize> Span<'_, N> {
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(move |i| self.byte_at(i))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_and_scan() {
        let mut intake = Intake::<5>::new();
        let (mut producer, mut consumer) = intake.split();
        assert!(consumer.is_empty());
        assert_eq!(consumer.peek(), None);
        producer.push(13);
        producer.push(15);
        assert_eq!(consumer.available(), 2);
        assert_eq!(consumer.next_byte(), Some(13));
        assert_eq!(consumer.next_byte(), Some(15));
        assert_eq!(consumer.next_byte(), None);
        assert!(consumer.is_empty());
    }

    #[test]
    fn write_zeroes_next_cell() {
        let mut intake = Intake::<4>::new();
        {
            let (mut producer, mut consumer) = intake.split();
            producer.push_slice(&[1, 2, 3]);
            while consumer.next_byte().is_some() {}
            // write is now at 3; the next push lands there and clears cell 0
            producer.push(4);
            assert_eq!(consumer.next_byte(), Some(4));
        }
        assert_eq!(intake.cell(0), 0);
    }

    #[test]
    fn span_hides_wraparound() {
        let mut intake = Intake::<5>::new();
        let (mut producer, mut consumer) = intake.split();
        producer.push_slice(&[9, 9, 9]);
        for _ in 0..3 {
            consumer.advance_scan();
        }
        consumer.commit();
        producer.push_slice(b"$AB*");
        for _ in 0..4 {
            consumer.advance_scan();
        }
        let span = consumer.span();
        assert_eq!(span.len(), 4);
        let mut got = [0u8; 4];
        for (dst, src) in got.iter_mut().zip(span.iter()) {
            *dst = src;
        }
        assert_eq!(&got, b"$AB*");
    }

    #[test]
    fn commit_releases_span() {
        let mut intake = Intake::<8>::new();
        let (mut producer, mut consumer) = intake.split();
        producer.push_slice(b"abc");
        consumer.advance_scan();
        consumer.advance_scan();
        assert_eq!(consumer.pending_len(), 2);
        consumer.commit();
        assert_eq!(consumer.pending_len(), 0);
        assert_eq!(consumer.available(), 1);
    }

    #[test]
    fn advance_scan_never_passes_write() {
        let mut intake = Intake::<4>::new();
        let (mut producer, mut consumer) = intake.split();
        producer.push(1);
        consumer.advance_scan();
        consumer.advance_scan();
        consumer.advance_scan();
        assert!(consumer.is_empty());
        assert_eq!(consumer.pending_len(), 1);
    }

    #[test]
    #[should_panic]
    fn span_index_out_of_bounds() {
        let mut intake = Intake::<4>::new();
        let (mut producer, mut consumer) = intake.split();
        producer.push(1);
        consumer.advance_scan();
        let _ = consumer.span().byte_at(1);
    }
}
