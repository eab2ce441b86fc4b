//! Fixed-capacity mouse snapshot queue.
//!
//! [`InputQueue`] is a 16-slot ring stored as parallel arrays (x, y, button,
//! class tag, device id, motion mode) with 4-bit cursors that wrap by masking. It lives inline
//! in the window object and never allocates.
//!
//! # Rules
//! - [`InputQueue::push`] advances `tail` only when the snapshot differs from the
//!   one most recently written, so the queue never holds two consecutive equal
//!   states. The comparison is against the last *written* slot, even if it was
//!   already consumed; a fresh queue compares against the zeroed slot.
//! - `head` only moves while draining (or when an overflowing push evicts the
//!   oldest unconsumed entry).
//! - Overflow is deterministic: the oldest entry is overwritten, `head` moves
//!   with it, and [`InputQueue::dropped`] counts the loss. The slot before the
//!   new head now holds the newest entry, so the head's absolute delta reads
//!   as zero until it is consumed.
//!
//! One writer (the platform delivery path) and one reader (the poll call) on the
//! same thread. Nothing here is synchronized.

use crate::event::{DeviceClass, DeviceId, MotionMode};
use crate::snapshot::MouseSnapshot;

/// Cursor width in bits.
pub const QUEUE_BITS: u32 = 4;
/// Slot count. Must stay a power of two.
pub const QUEUE_SIZE: usize = 1 << QUEUE_BITS;
const QUEUE_MASK: u8 = (QUEUE_SIZE - 1) as u8;

#[inline]
const fn next(i: u8) -> u8 {
    i.wrapping_add(1) & QUEUE_MASK
}

#[inline]
const fn prev(i: u8) -> u8 {
    i.wrapping_sub(1) & QUEUE_MASK
}

/// One queued entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedInput {
    pub class: DeviceClass,
    pub device: DeviceId,
    pub mode: MotionMode,
    pub snapshot: MouseSnapshot,
}

/// Per-window ring of mouse snapshots.
#[derive(Clone, Debug)]
pub struct InputQueue {
    x: [i16; QUEUE_SIZE],
    y: [i16; QUEUE_SIZE],
    button: [u8; QUEUE_SIZE],
    class: [DeviceClass; QUEUE_SIZE],
    device: [DeviceId; QUEUE_SIZE],
    mode: [MotionMode; QUEUE_SIZE],
    head: u8,
    tail: u8,
    len: u8,
    dropped: u32,
    // Set when overflow overwrote the slot preceding `head`.
    orphaned: bool,
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InputQueue {
    pub const fn new() -> Self {
        Self {
            x: [0; QUEUE_SIZE],
            y: [0; QUEUE_SIZE],
            button: [0; QUEUE_SIZE],
            class: [DeviceClass::Unknown; QUEUE_SIZE],
            device: [0; QUEUE_SIZE],
            mode: [MotionMode::Relative; QUEUE_SIZE],
            head: 0,
            tail: 0,
            len: 0,
            dropped: 0,
            orphaned: false,
        }
    }

    #[inline]
    fn snapshot_at(&self, i: u8) -> MouseSnapshot {
        let i = i as usize;
        MouseSnapshot::new(self.x[i], self.y[i], self.button[i])
    }

    #[inline]
    fn entry_at(&self, i: u8) -> QueuedInput {
        QueuedInput {
            class: self.class[i as usize],
            device: self.device[i as usize],
            mode: self.mode[i as usize],
            snapshot: self.snapshot_at(i),
        }
    }

    /// Most recently written snapshot. This is the carry-forward seed.
    #[inline]
    pub fn last(&self) -> MouseSnapshot {
        self.snapshot_at(prev(self.tail))
    }

    /// Queue `snapshot` unless it equals [`InputQueue::last`]. `mode` tags how
    /// the report that produced it carried motion.
    ///
    /// Returns `true` if `tail` advanced.
    pub fn push(
        &mut self,
        class: DeviceClass,
        device: DeviceId,
        mode: MotionMode,
        snapshot: MouseSnapshot,
    ) -> bool {
        if snapshot == self.last() {
            return false;
        }

        let t = self.tail as usize;
        self.x[t] = snapshot.x;
        self.y[t] = snapshot.y;
        self.button[t] = snapshot.button;
        self.class[t] = class;
        self.device[t] = device;
        self.mode[t] = mode;
        self.tail = next(self.tail);

        if self.len as usize == QUEUE_SIZE {
            // The slot just written was the oldest unconsumed one.
            self.head = next(self.head);
            self.orphaned = true;
            self.dropped = self.dropped.saturating_add(1);
            tracing::warn!(
                dropped = self.dropped,
                "input queue overflow; oldest snapshot overwritten"
            );
        } else {
            self.len += 1;
        }
        true
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unconsumed entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        QUEUE_SIZE
    }

    #[inline]
    pub fn head(&self) -> u8 {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> u8 {
        self.tail
    }

    /// Entries lost to overflow since the last [`InputQueue::clear`].
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Oldest unconsumed entry.
    #[inline]
    pub fn front(&self) -> Option<QueuedInput> {
        (!self.is_empty()).then(|| self.entry_at(self.head))
    }

    /// Consume the oldest entry. No-op when empty.
    #[inline]
    pub fn advance(&mut self) {
        if self.len > 0 {
            self.head = next(self.head);
            self.len -= 1;
            self.orphaned = false;
        }
    }

    /// Drain every unconsumed entry in FIFO order.
    ///
    /// `head` advances as each item is yielded; dropping the iterator early
    /// leaves the remaining entries queued.
    pub fn pop_all(&mut self) -> Drain<'_> {
        Drain { queue: self }
    }

    /// Reset to the zeroed state, including the carry-forward seed.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Slot the query API reads: `head` while entries are pending, otherwise
    /// the most recently written slot.
    #[inline]
    fn cursor(&self) -> u8 {
        if self.is_empty() {
            prev(self.tail)
        } else {
            self.head
        }
    }

    /// Snapshot the query API reads: head while pending, else the last written.
    #[inline]
    pub fn current(&self) -> MouseSnapshot {
        self.snapshot_at(self.cursor())
    }

    /// Motion mode tagged on the slot the query API reads.
    #[inline]
    pub fn mode(&self) -> MotionMode {
        self.mode[self.cursor() as usize]
    }

    /// Slot holding the predecessor of the cursor slot. After an overflow the
    /// head's real predecessor is gone and the head stands in for itself.
    #[inline]
    fn predecessor(&self) -> u8 {
        let i = self.cursor();
        if self.orphaned && !self.is_empty() {
            i
        } else {
            prev(i)
        }
    }

    /// Position as reported to `MOUSE_X` / `MOUSE_Y`, using the mode tagged on
    /// the slot being read.
    ///
    /// Relative devices store accumulated positions, which pass through.
    /// Absolute devices report the change against the preceding slot.
    #[inline]
    pub fn position(&self) -> (i32, i32) {
        self.position_as(self.mode())
    }

    #[inline]
    fn position_as(&self, mode: MotionMode) -> (i32, i32) {
        let i = self.cursor() as usize;
        let p = self.predecessor() as usize;
        // All ones for absolute, zero for relative.
        let keep = -((mode == MotionMode::Absolute) as i32);
        (
            i32::from(self.x[i]) - (keep & i32::from(self.x[p])),
            i32::from(self.y[i]) - (keep & i32::from(self.y[p])),
        )
    }

    /// Change of the current snapshot against the preceding slot.
    #[inline]
    pub fn delta(&self) -> (i32, i32) {
        self.position_as(MotionMode::Absolute)
    }
}

/// Iterator returned by [`InputQueue::pop_all`].
#[derive(Debug)]
pub struct Drain<'a> {
    queue: &'a mut InputQueue,
}

impl Iterator for Drain<'_> {
    type Item = QueuedInput;

    fn next(&mut self) -> Option<QueuedInput> {
        let item = self.queue.front()?;
        self.queue.advance();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}

impl ExactSizeIterator for Drain<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snap(x: i16, y: i16, b: u8) -> MouseSnapshot {
        MouseSnapshot::new(x, y, b)
    }

    fn drain(q: &mut InputQueue) -> Vec<MouseSnapshot> {
        q.pop_all().map(|e| e.snapshot).collect()
    }

    #[test]
    fn consecutive_duplicates_are_coalesced() {
        let mut q = InputQueue::new();
        assert!(q.push(DeviceClass::Mouse, 0, MotionMode::Relative, snap(1, 2, 0)));
        assert!(!q.push(DeviceClass::Mouse, 0, MotionMode::Relative, snap(1, 2, 0)));
        assert_eq!(q.len(), 1);
        assert_eq!(q.tail(), 1);
    }

    #[test]
    fn zeroed_state_is_a_duplicate_on_a_fresh_queue() {
        let mut q = InputQueue::new();
        assert!(!q.push(DeviceClass::Mouse, 0, MotionMode::Relative, MouseSnapshot::default()));
        assert!(q.is_empty());
    }

    #[test]
    fn duplicate_of_consumed_entry_stays_empty() {
        let mut q = InputQueue::new();
        q.push(DeviceClass::Mouse, 0, MotionMode::Relative, snap(4, 4, 1));
        assert_eq!(drain(&mut q).len(), 1);
        assert!(!q.push(DeviceClass::Mouse, 0, MotionMode::Relative, snap(4, 4, 1)));
        assert!(q.is_empty());
    }

    #[test]
    fn drains_in_push_order() {
        let mut q = InputQueue::new();
        let pushed: Vec<_> = (1..=10).map(|i| snap(i, -i, (i % 4) as u8)).collect();
        for s in &pushed {
            q.push(DeviceClass::Mouse, 7, MotionMode::Relative, *s);
        }
        let entries: Vec<_> = q.pop_all().collect();
        assert_eq!(entries.iter().map(|e| e.snapshot).collect::<Vec<_>>(), pushed);
        assert!(entries.iter().all(|e| e.class == DeviceClass::Mouse && e.device == 7));
        assert!(q.is_empty());
        assert_eq!(q.head(), q.tail());
    }

    #[test]
    fn sixteen_pushes_wrap_tail_onto_head() {
        let mut q = InputQueue::new();
        let start = q.head();
        let pushed: Vec<_> = (1..=16).map(|i| snap(i, 0, 0)).collect();
        for s in &pushed {
            q.push(DeviceClass::Mouse, 0, MotionMode::Relative, *s);
        }
        assert_eq!(q.tail(), start);
        assert_eq!(q.len(), QUEUE_SIZE);
        assert_eq!(q.dropped(), 0);
        assert_eq!(drain(&mut q), pushed);
    }

    #[test]
    fn overflow_keeps_most_recent_sixteen() {
        let mut q = InputQueue::new();
        let pushed: Vec<_> = (1..=20).map(|i| snap(i, i, 0)).collect();
        for s in &pushed {
            q.push(DeviceClass::Mouse, 0, MotionMode::Relative, *s);
        }
        assert_eq!(q.dropped(), 4);
        assert_eq!(drain(&mut q), pushed[4..].to_vec());
    }

    #[test]
    fn partial_drain_leaves_remainder() {
        let mut q = InputQueue::new();
        for i in 1..=3 {
            q.push(DeviceClass::Mouse, 0, MotionMode::Relative, snap(i, 0, 0));
        }
        let first = q.pop_all().next().unwrap();
        assert_eq!(first.snapshot, snap(1, 0, 0));
        assert_eq!(q.len(), 2);
        assert_eq!(q.front().unwrap().snapshot, snap(2, 0, 0));
    }

    #[test]
    fn position_follows_the_mode_of_each_slot() {
        let mut q = InputQueue::new();
        q.push(DeviceClass::Mouse, 0, MotionMode::Relative, snap(100, 50, 0));
        q.push(DeviceClass::Mouse, 1, MotionMode::Absolute, snap(130, 40, 0));
        q.push(DeviceClass::Mouse, 0, MotionMode::Relative, snap(135, 40, 0));

        assert_eq!(q.mode(), MotionMode::Relative);
        assert_eq!(q.position(), (100, 50));
        q.advance();
        // head now at the absolute entry; preceding slot holds (100, 50)
        assert_eq!(q.mode(), MotionMode::Absolute);
        assert_eq!(q.position(), (30, -10));
        assert_eq!(q.delta(), (30, -10));
        q.advance();
        assert_eq!(q.position(), (135, 40));
        assert_eq!(q.delta(), (5, 0));
        q.advance();
        // empty: reads the last written slot
        assert_eq!(q.current(), snap(135, 40, 0));
        assert_eq!(q.mode(), MotionMode::Relative);
    }

    #[test]
    fn entries_carry_their_mode() {
        let mut q = InputQueue::new();
        q.push(DeviceClass::Mouse, 3, MotionMode::Absolute, snap(9, 9, 0));
        let entry = q.front().unwrap();
        assert_eq!(entry.mode, MotionMode::Absolute);
        assert_eq!(entry.device, 3);
    }

    #[test]
    fn overflowed_head_has_no_absolute_delta() {
        let mut q = InputQueue::new();
        for i in 1..=18 {
            q.push(DeviceClass::Mouse, 0, MotionMode::Absolute, snap(i * 10, 0, 0));
        }
        // Oldest survivor is (30, 0); its predecessor (20, 0) was overwritten.
        assert_eq!(q.current(), snap(30, 0, 0));
        assert_eq!(q.position(), (0, 0));
        q.advance();
        assert_eq!(q.position(), (10, 0));
        // A later overflow orphans the new head again.
        for i in 19..=20 {
            q.push(DeviceClass::Mouse, 0, MotionMode::Absolute, snap(i * 10, 0, 0));
        }
        assert_eq!(q.current(), snap(50, 0, 0));
        assert_eq!(q.delta(), (0, 0));
    }

    #[test]
    fn clear_resets_seed_and_counters() {
        let mut q = InputQueue::new();
        for i in 1..=17 {
            q.push(DeviceClass::Mouse, 0, MotionMode::Relative, snap(i, 0, 0));
        }
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.dropped(), 0);
        assert_eq!(q.last(), MouseSnapshot::default());
    }
}
