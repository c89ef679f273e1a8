//! Request slot table
//!
//! Fixed-capacity buffering for display requests. Submissions claim the
//! lowest free index; the engine drains slots in ascending-index order. Under
//! sustained load this degenerates to FIFO by index, but it is not
//! starvation-proof: a low index that is repeatedly vacated and reclaimed can
//! be serviced ahead of a waiting high index. That matches the original
//! firmware and is a documented limitation, not something this table guards
//! against.

/// One queued display request
///
/// `Write` holds a borrowed view of the caller's text: the engine never
/// copies the bytes, so the storage must stay valid for the engine's
/// lifetime parameter. `cursor` is the index of the next character to latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestKind<'a> {
    /// Slot is empty
    None,
    /// Write characters at the current cursor position
    Write { text: &'a [u8], cursor: usize },
    /// Clear the display
    Clear,
    /// Latch an arbitrary command byte
    RawCommand(u8),
    /// Move the cursor
    SetPosition { row: u8, col: u8 },
    /// Request finished; slot awaiting reclaim by the engine
    Done,
}

/// Servicing progress of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress {
    /// Claimed, not yet serviced
    Start,
    /// Currently being serviced
    InProgress,
    /// Serviced to completion
    Finished,
}

/// One slot of the request table
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct Slot<'a> {
    pub kind: RequestKind<'a>,
    pub progress: Progress,
    pub occupied: bool,
}

impl<'a> Slot<'a> {
    const EMPTY: Self = Self {
        kind: RequestKind::None,
        progress: Progress::Start,
        occupied: false,
    };
}

/// Fixed-capacity table of display requests
///
/// `N` is the compile-time slot count. A slot's `occupied` flag is true from
/// successful claim until the engine reclaims the finished request.
#[derive(Debug)]
pub struct SlotTable<'a, const N: usize> {
    slots: [Slot<'a>; N],
}

impl<'a, const N: usize> SlotTable<'a, N> {
    pub const fn new() -> Self {
        Self {
            slots: [Slot::EMPTY; N],
        }
    }

    /// Claim the lowest free slot for a request
    ///
    /// Returns the claimed index, or `None` when all slots are occupied.
    /// The claimed slot starts at [`Progress::Start`].
    pub(crate) fn claim(&mut self, kind: RequestKind<'a>) -> Option<usize> {
        let index = self.slots.iter().position(|slot| !slot.occupied)?;
        self.slots[index] = Slot {
            kind,
            progress: Progress::Start,
            occupied: true,
        };
        Some(index)
    }

    /// Release a slot back to the free pool
    pub(crate) fn release(&mut self, index: usize) {
        self.slots[index] = Slot::EMPTY;
    }

    /// Lowest occupied index, scanning ascending
    pub(crate) fn next_occupied(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.occupied)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Slot<'a> {
        &mut self.slots[index]
    }

    pub(crate) fn slot(&self, index: usize) -> &Slot<'a> {
        &self.slots[index]
    }

    /// Whether a slot currently holds a pending request
    pub fn is_occupied(&self, index: usize) -> bool {
        self.slots[index].occupied
    }

    /// Number of occupied slots
    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|slot| slot.occupied).count()
    }

    /// Total slot count
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<'a, const N: usize> Default for SlotTable<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}
