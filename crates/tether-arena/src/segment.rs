//! Contiguous memory segments and growable segment lists.
//!
//! A [`Segment`] is a contiguous `Vec<u8>` with bump allocation. A
//! [`SegmentList`] overflows into new segments when the current one is full.
//! Segments are never reset: an arena's memory is reclaimed only by dropping
//! the whole list.

use crate::error::ArenaError;

/// A single contiguous memory segment with bump allocation.
pub struct Segment {
    /// Backing storage. Allocated to full capacity at creation.
    data: Vec<u8>,
    /// Bump pointer: next free byte.
    cursor: usize,
}

impl Segment {
    /// Create a zeroed segment with the given capacity in bytes.
    pub fn new(capacity: u32) -> Self {
        Self {
            data: vec![0; capacity as usize],
            cursor: 0,
        }
    }

    /// Bump-allocate `len` bytes aligned to `align`.
    ///
    /// `align` must be a power of two. Returns the starting offset, or `None`
    /// if the remaining capacity is insufficient.
    pub fn alloc(&mut self, len: u32, align: u32) -> Option<u32> {
        let align = align as usize;
        let start = self.cursor.checked_add(align - 1)? & !(align - 1);
        let end = start.checked_add(len as usize)?;
        if end > self.data.len() {
            return None;
        }
        self.cursor = end;
        u32::try_from(start).ok()
    }

    /// Shared view of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the segment.
    pub fn slice(&self, offset: u32, len: u32) -> &[u8] {
        let start = offset as usize;
        &self.data[start..start + len as usize]
    }

    /// Mutable view of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the segment.
    pub fn slice_mut(&mut self, offset: u32, len: u32) -> &mut [u8] {
        let start = offset as usize;
        &mut self.data[start..start + len as usize]
    }

    /// Bytes handed out so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Remaining free capacity in bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }
}

/// A growable list of [`Segment`]s with overflow-based bump allocation.
///
/// Allocations never straddle segments: one that does not fit in the
/// current segment is placed at the start of a fresh one.
pub struct SegmentList {
    segments: Vec<Segment>,
    segment_size: u32,
    max_segments: u16,
}

impl SegmentList {
    /// Create a new segment list with one pre-allocated segment.
    pub fn new(segment_size: u32, max_segments: u16) -> Self {
        Self {
            segments: vec![Segment::new(segment_size)],
            segment_size,
            max_segments,
        }
    }

    /// Bump-allocate `len` bytes, growing into a new segment if needed.
    ///
    /// Returns `(segment_index, offset)` on success.
    pub fn alloc(&mut self, len: u32, align: u32) -> Result<(u16, u32), ArenaError> {
        if len > self.segment_size {
            return Err(self.exceeded(len));
        }

        let current = self.segments.len() - 1;
        if let Some(offset) = self.segments[current].alloc(len, align) {
            return Ok((current as u16, offset));
        }

        if self.segments.len() >= self.max_segments as usize {
            return Err(self.exceeded(len));
        }

        // Offset 0 satisfies any alignment up to the segment size.
        let mut seg = Segment::new(self.segment_size);
        let offset = seg.alloc(len, align).ok_or_else(|| self.exceeded(len))?;
        self.segments.push(seg);
        Ok(((self.segments.len() - 1) as u16, offset))
    }

    /// Shared view into the given segment.
    pub fn slice(&self, segment_index: u16, offset: u32, len: u32) -> &[u8] {
        self.segments[segment_index as usize].slice(offset, len)
    }

    /// Mutable view into the given segment.
    pub fn slice_mut(&mut self, segment_index: u16, offset: u32, len: u32) -> &mut [u8] {
        self.segments[segment_index as usize].slice_mut(offset, len)
    }

    /// Whether `offset..offset + len` of `segment_index` has been handed out.
    pub fn covers(&self, segment_index: u16, offset: u32, len: u32) -> bool {
        self.segments
            .get(segment_index as usize)
            .is_some_and(|seg| u64::from(offset) + u64::from(len) <= seg.used() as u64)
    }

    /// Number of segments currently allocated.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Bytes reserved by all segments.
    pub fn memory_bytes(&self) -> usize {
        self.segments.iter().map(Segment::capacity).sum()
    }

    /// Bytes handed out across all segments.
    pub fn total_used(&self) -> usize {
        self.segments.iter().map(Segment::used).sum()
    }

    /// Size of each segment in bytes.
    pub fn segment_size(&self) -> u32 {
        self.segment_size
    }

    fn exceeded(&self, len: u32) -> ArenaError {
        ArenaError::CapacityExceeded {
            requested: len as usize,
            capacity: self.max_segments as usize * self.segment_size as usize,
        }
    }
}
