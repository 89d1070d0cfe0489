//! Rank-space windows.
//!
//! A [`Window`] names the main-index positions `[start, start + page_size]`,
//! both ends inclusive. The store clamps a stop past the end, so a window is
//! never padded with members that do not exist.

/// A contiguous slice of the main index in store order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// First position (0-based).
    pub start: u64,
    /// Positions after `start` included in the window.
    pub page_size: u64,
}

impl Window {
    /// The window around the entity at `position`, `offset` members each side.
    ///
    /// Near the top the window shrinks instead of reaching above position 0.
    /// Near the bottom it is left to the store's clamping.
    pub fn around(position: u64, offset: u32) -> Self {
        let offset = u64::from(offset);
        let start = position.saturating_sub(offset);
        let page_size = if position > offset { offset * 2 } else { position + offset };
        Self { start, page_size }
    }

    /// The window holding the entity at `position`.
    ///
    /// Covers one extra position; callers pick the row they asked for.
    pub fn at(position: u64) -> Self {
        Self { start: position, page_size: 1 }
    }

    /// The window of `count` members starting at `start`. `count` must be at least 1.
    pub fn span(start: u64, count: u64) -> Self {
        Self { start, page_size: count.saturating_sub(1) }
    }

    /// Page `index` (0-based) of `page_size` members. `page_size` must be at least 1.
    pub fn page(index: u64, page_size: u32) -> Self {
        let size = u64::from(page_size);
        Self { start: index.saturating_mul(size), page_size: size.saturating_sub(1) }
    }

    /// Last position (inclusive).
    pub fn stop(&self) -> u64 {
        self.start.saturating_add(self.page_size)
    }
}
