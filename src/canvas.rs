//! Canvas: a small char-cell grid for the single status screen.
//!
//! Stands in for the device's 128x64 monochrome canvas at terminal-cell
//! resolution. Drawing is plain cell writes; emission is a cursor-addressed
//! ANSI stream assembled into a pre-allocated buffer and flushed in one
//! write by the renderer.

use std::io::{self, Write};

use crossterm::{cursor::MoveTo, queue, style::Print};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Logical screen width in cells.
pub const SCREEN_WIDTH: u16 = 64;
/// Logical screen height in cells.
pub const SCREEN_HEIGHT: u16 = 16;

/// Horizontal anchoring for [`Canvas::draw_str_aligned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Text starts at the anchor column.
    Left,
    /// Text ends at the anchor column.
    Right,
}

/// A fixed-size grid of cells.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<char>,
}

impl Canvas {
    /// Create a blank canvas.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; usize::from(width) * usize::from(height)],
        }
    }

    /// Canvas width in cells.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Canvas height in cells.
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    /// Write a single cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u16, y: u16, ch: char) {
        if x < self.width && y < self.height {
            self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)] = ch;
        }
    }

    /// Read a single cell. Out-of-bounds reads yield blank.
    pub fn get(&self, x: u16, y: u16) -> char {
        if x < self.width && y < self.height {
            self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)]
        } else {
            ' '
        }
    }

    /// Draw a rectangular frame on the canvas boundary.
    pub fn draw_frame(&mut self) {
        if self.width < 2 || self.height < 2 {
            return;
        }
        let right = self.width - 1;
        let bottom = self.height - 1;
        for x in 1..right {
            self.set(x, 0, '─');
            self.set(x, bottom, '─');
        }
        for y in 1..bottom {
            self.set(0, y, '│');
            self.set(right, y, '│');
        }
        self.set(0, 0, '┌');
        self.set(right, 0, '┐');
        self.set(0, bottom, '└');
        self.set(right, bottom, '┘');
    }

    /// Draw a one-line string anchored at `(x, y)`.
    ///
    /// With `Align::Right` the last column of the text lands on `x`;
    /// with `Align::Left` the first column does.
    pub fn draw_str_aligned(&mut self, x: u16, y: u16, align: Align, text: &str) {
        let text_width = u16::try_from(UnicodeWidthStr::width(text)).unwrap_or(u16::MAX);
        let mut col = match align {
            Align::Left => x,
            Align::Right => x.saturating_sub(text_width.saturating_sub(1)),
        };
        for ch in text.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if w == 0 {
                continue;
            }
            self.set(col, y, ch);
            col = col.saturating_add(u16::try_from(w).unwrap_or(1));
        }
    }

    /// Append the cursor-addressed ANSI representation of the canvas.
    pub fn emit(&self, out: &mut Vec<u8>) -> io::Result<()> {
        for y in 0..self.height {
            let start = usize::from(y) * usize::from(self.width);
            let row: String = self.cells[start..start + usize::from(self.width)]
                .iter()
                .collect();
            queue!(out, MoveTo(0, y), Print(row))?;
        }
        out.flush()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}
