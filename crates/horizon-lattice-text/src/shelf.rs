//! Shelf-based rectangle packing.
//!
//! Rectangles are placed on horizontal shelves. Each request goes to the
//! existing shelf that wastes the least height, or opens a new shelf below the
//! last one when none fits. Packing a batch sorts it tallest first, which
//! keeps shelves tight, and reports placements in the caller's order.

/// A shelf in the packing area (horizontal row of placements).
#[derive(Debug)]
struct Shelf {
    /// Y position of this shelf.
    y: u32,
    /// Height of this shelf.
    height: u32,
    /// Current X position for the next placement.
    cursor_x: u32,
}

impl Shelf {
    fn new(y: u32, height: u32) -> Self {
        Self {
            y,
            height,
            cursor_x: 0,
        }
    }

    /// Try to place a rectangle on this shelf.
    fn try_allocate(&mut self, width: u32, height: u32, area_width: u32) -> Option<(u32, u32)> {
        if height > self.height {
            return None;
        }

        if self.cursor_x + width > area_width {
            return None;
        }

        let x = self.cursor_x;
        self.cursor_x += width;
        Some((x, self.y))
    }

    /// Get remaining width in this shelf.
    fn remaining_width(&self, area_width: u32) -> u32 {
        area_width.saturating_sub(self.cursor_x)
    }
}

/// Result of packing one rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Left edge, or [`ShelfPacker::UNPLACED`].
    pub x: u32,
    /// Top edge, or [`ShelfPacker::UNPLACED`].
    pub y: u32,
    /// Whether the rectangle fit.
    pub packed: bool,
}

impl Placement {
    const REJECTED: Self = Self {
        x: ShelfPacker::UNPLACED,
        y: ShelfPacker::UNPLACED,
        packed: false,
    };
}

/// Packs rectangles into a fixed `width` x `height` area.
#[derive(Debug)]
pub struct ShelfPacker {
    width: u32,
    height: u32,
    shelves: Vec<Shelf>,
    next_shelf_y: u32,
}

impl ShelfPacker {
    /// Coordinate reported for rectangles that did not fit.
    pub const UNPLACED: u32 = 0xFFFF;

    /// Create an empty packer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            shelves: Vec::new(),
            next_shelf_y: 0,
        }
    }

    /// Width of the packing area.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the packing area.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Try to place a single rectangle.
    pub fn allocate(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width > self.width || height > self.height {
            return None;
        }

        // Try existing shelves first (best fit)
        let mut best_shelf_idx = None;
        let mut best_waste = u32::MAX;

        for (idx, shelf) in self.shelves.iter().enumerate() {
            if height <= shelf.height && shelf.remaining_width(self.width) >= width {
                let waste = shelf.height - height;
                if waste < best_waste {
                    best_waste = waste;
                    best_shelf_idx = Some(idx);
                }
            }
        }

        if let Some(idx) = best_shelf_idx {
            if let Some(pos) = self.shelves[idx].try_allocate(width, height, self.width) {
                return Some(pos);
            }
        }

        // Open a new shelf if there's room
        if self.next_shelf_y + height <= self.height {
            let mut shelf = Shelf::new(self.next_shelf_y, height);
            let pos = shelf.try_allocate(width, height, self.width)?;
            self.next_shelf_y += height;
            self.shelves.push(shelf);
            return Some(pos);
        }

        None
    }

    /// Pack a batch of `(width, height)` rectangles.
    ///
    /// The result is index-aligned with `sizes`. Rectangles that do not fit
    /// are reported with `packed == false`; the rest of the batch is still
    /// attempted.
    pub fn pack(&mut self, sizes: &[(u32, u32)]) -> Vec<Placement> {
        let mut order: Vec<usize> = (0..sizes.len()).collect();
        order.sort_by(|&a, &b| sizes[b].1.cmp(&sizes[a].1).then(sizes[b].0.cmp(&sizes[a].0)));

        let mut placements = vec![Placement::REJECTED; sizes.len()];
        for idx in order {
            let (width, height) = sizes[idx];
            if let Some((x, y)) = self.allocate(width, height) {
                placements[idx] = Placement { x, y, packed: true };
            }
        }
        placements
    }

    /// Get the fraction of the area covered by shelves in use.
    pub fn usage(&self) -> f32 {
        if self.shelves.is_empty() || self.width == 0 || self.height == 0 {
            return 0.0;
        }

        let total_pixels = (self.width as f32) * (self.height as f32);
        let used_pixels: f32 = self
            .shelves
            .iter()
            .map(|s| (s.cursor_x as f32) * (s.height as f32))
            .sum();

        used_pixels / total_pixels
    }
}
