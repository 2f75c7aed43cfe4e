//! Virtual screen buffer with a diffing renderer.
//!
//! A [`Buffer`] is a grid of [`Pixel`]s. After each write the grid is snapshotted; the next
//! [`Buffer::render`] only emits the cells that differ from that snapshot.
//!
//! Invariant: `pixels.len() == height` and every row has `width` pixels.

use std::fmt;
use std::fmt::Write as _;
use std::ops::{Index, IndexMut};

use once_cell::sync::Lazy;
use unicode_width::UnicodeWidthStr;

use crate::config::EnvConfig;
use crate::core::geometry::Rect;
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::style::Style;
use crate::core::terminal::{Terminal, DEFAULT_COLUMNS, DEFAULT_ROWS};
use crate::platform::terminal_size;
use crate::render::pixel::Pixel;

const RESET: &str = "\x1b[0m";

static DEBUG_REDRAW: Lazy<bool> = Lazy::new(|| EnvConfig::from_env().debug_redraw);

#[derive(Debug, Clone)]
pub struct Buffer {
    width: usize,
    height: usize,
    fill: String,
    pixels: Vec<Vec<Pixel>>,
    cache: Option<Vec<Vec<Pixel>>>,
    clear_pending: bool,
}

impl Buffer {
    /// A `width` x `height` buffer filled with spaces.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_fill(width, height, " ")
    }

    pub fn with_fill(width: usize, height: usize, fill: impl Into<String>) -> Self {
        let fill = fill.into();
        Self {
            width,
            height,
            pixels: blank_rows(width, height, &fill),
            fill,
            cache: None,
            clear_pending: false,
        }
    }

    /// A buffer covering the controlling terminal, or 80x24 when there is none.
    pub fn for_current_terminal() -> Self {
        let (cols, rows) = terminal_size().unwrap_or((0, 0));
        Self::sized(cols, rows)
    }

    /// A buffer covering `terminal`. A dimension the terminal reports as 0 falls back to
    /// 80 columns or 24 rows.
    pub fn for_terminal<T: Terminal + ?Sized>(terminal: &T) -> Self {
        Self::sized(terminal.columns(), terminal.rows())
    }

    fn sized(cols: u16, rows: u16) -> Self {
        let cols = if cols == 0 { DEFAULT_COLUMNS } else { cols };
        let rows = if rows == 0 { DEFAULT_ROWS } else { rows };
        Self::new(cols as usize, rows as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fill(&self) -> &str {
        &self.fill
    }

    pub fn area(&self) -> Rect {
        Rect::of_size(self.width, self.height)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.pixels.iter().map(Vec::as_slice)
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&Pixel> {
        self.pixels.get(row).and_then(|cells| cells.get(col))
    }

    pub fn get_mut(&mut self, col: usize, row: usize) -> Option<&mut Pixel> {
        self.pixels.get_mut(row).and_then(|cells| cells.get_mut(col))
    }

    /// Set one cell. Returns `false` when `(col, row)` is outside the buffer.
    pub fn set(&mut self, col: usize, row: usize, symbol: &str, style: Style) -> bool {
        match self.get_mut(col, row) {
            Some(pixel) => {
                pixel.set(symbol, Some(style));
                true
            }
            None => false,
        }
    }

    /// Change the dimensions. `None` keeps the current value.
    ///
    /// Resizing always clears: the next render repaints the whole screen.
    pub fn resize(&mut self, width: Option<usize>, height: Option<usize>) {
        self.clear();
        let width = width.unwrap_or(self.width);
        let height = height.unwrap_or(self.height);

        if height > self.height {
            self.pixels
                .extend(blank_rows(self.width, height - self.height, &self.fill));
        } else {
            self.pixels.truncate(height);
        }

        for row in &mut self.pixels {
            if width > row.len() {
                let missing = width - row.len();
                row.extend((0..missing).map(|_| Pixel::new(self.fill.as_str(), Style::default())));
            } else {
                row.truncate(width);
            }
        }

        tracing::debug!(
            from_width = self.width,
            from_height = self.height,
            width,
            height,
            "buffer resized"
        );
        self.width = width;
        self.height = height;
    }

    /// Reset every pixel, drop the cache, and erase the screen on the next render.
    pub fn clear(&mut self) {
        self.cache = None;
        self.clear_pending = true;
        self.reset_pixels();
    }

    /// Snapshot the current pixels as what the terminal shows.
    pub fn cache(&mut self) {
        self.cache = Some(self.pixels.clone());
    }

    /// Control sequences that bring the terminal from the cached frame to the current one.
    pub fn render(&self) -> String {
        let mut out = DiffWriter::default();
        match self.cache.as_ref() {
            Some(cache) if cache.len() == self.pixels.len() => {
                for (row, (current, previous)) in self.pixels.iter().zip(cache).enumerate() {
                    if current.len() != previous.len() {
                        for (col, pixel) in current.iter().enumerate() {
                            out.pixel(row, col, pixel);
                        }
                        continue;
                    }
                    for (col, (pixel, cached)) in current.iter().zip(previous).enumerate() {
                        if pixel != cached {
                            out.pixel(row, col, pixel);
                        }
                    }
                }
            }
            _ => {
                for (row, cells) in self.pixels.iter().enumerate() {
                    for (col, pixel) in cells.iter().enumerate() {
                        out.pixel(row, col, pixel);
                    }
                }
            }
        }

        if *DEBUG_REDRAW {
            tracing::debug!(
                emitted = out.emitted,
                full = self.cache.is_none(),
                bytes = out.buf.len(),
                "buffer render"
            );
        }
        out.finish()
    }

    /// Render, place the cursor, and snapshot.
    ///
    /// `cursor` is a 1-based `(row, col)`; without one the cursor parks at the bottom-right cell.
    pub fn frame(&mut self, cursor: Option<(u16, u16)>) -> Vec<TerminalCmd> {
        let mut cmds = Vec::new();
        if self.clear_pending {
            cmds.push(TerminalCmd::ClearScreen);
        }
        let diff = self.render();
        if !diff.is_empty() {
            cmds.push(TerminalCmd::Bytes(diff));
        }

        let (row, col) = cursor.unwrap_or_else(|| {
            let cols = self.pixels.first().map_or(0, Vec::len);
            (to_u16(self.pixels.len()), to_u16(cols))
        });
        cmds.push(TerminalCmd::MoveTo { row, col });
        cmds.push(TerminalCmd::ResetStyle);

        self.cache();
        self.clear_pending = false;
        cmds
    }

    /// Render the pending changes to `terminal` through a single output gate flush.
    pub fn write<T: Terminal + ?Sized>(&mut self, terminal: &mut T, cursor: Option<(u16, u16)>) {
        let mut gate = OutputGate::new();
        gate.extend(self.frame(cursor));
        gate.flush(terminal);
    }

    /// A writable window into this buffer.
    ///
    /// The origin is clamped into the buffer and the size to what remains past it.
    pub fn sub(&mut self, x: usize, y: usize, w: usize, h: usize) -> BufferView<'_> {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let w = w.min(self.width - x);
        let h = h.min(self.height - y);
        BufferView {
            buffer: self,
            rect: Rect::sized(x, y, w, h),
        }
    }

    fn reset_pixels(&mut self) {
        for row in &mut self.pixels {
            for pixel in row {
                pixel.set(self.fill.as_str(), Some(Style::default()));
            }
        }
    }
}

impl Index<usize> for Buffer {
    type Output = [Pixel];

    fn index(&self, row: usize) -> &[Pixel] {
        &self.pixels[row]
    }
}

impl IndexMut<usize> for Buffer {
    fn index_mut(&mut self, row: usize) -> &mut [Pixel] {
        &mut self.pixels[row]
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, row) in self.pixels.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            for pixel in row {
                write!(f, "{pixel}")?;
            }
        }
        Ok(())
    }
}

/// A rectangular window that writes straight into its parent [`Buffer`].
pub struct BufferView<'a> {
    buffer: &'a mut Buffer,
    rect: Rect,
}

impl BufferView<'_> {
    /// The window's area in parent coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn width(&self) -> usize {
        self.rect.width()
    }

    pub fn height(&self) -> usize {
        self.rect.height()
    }

    pub fn get(&self, col: usize, row: usize) -> Option<&Pixel> {
        if col >= self.width() || row >= self.height() {
            return None;
        }
        self.buffer.get(self.rect.left + col, self.rect.top + row)
    }

    /// Set one cell in view coordinates. Returns `false` outside the view.
    pub fn set(&mut self, col: usize, row: usize, symbol: &str, style: Style) -> bool {
        if col >= self.width() || row >= self.height() {
            return false;
        }
        self.buffer
            .set(self.rect.left + col, self.rect.top + row, symbol, style)
    }

    pub fn row_mut(&mut self, row: usize) -> Option<&mut [Pixel]> {
        if row >= self.height() {
            return None;
        }
        let (left, right) = (self.rect.left, self.rect.right);
        self.buffer
            .pixels
            .get_mut(self.rect.top + row)
            .map(|cells| &mut cells[left..right])
    }

    /// Overwrite every cell of the view.
    pub fn fill(&mut self, symbol: &str, style: Style) {
        for row in 0..self.height() {
            if let Some(cells) = self.row_mut(row) {
                for pixel in cells {
                    pixel.set(symbol, Some(style));
                }
            }
        }
    }

    /// A nested window, clamped to this one.
    pub fn sub(&mut self, x: usize, y: usize, w: usize, h: usize) -> BufferView<'_> {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let w = w.min(self.width() - x);
        let h = h.min(self.height() - y);
        BufferView {
            rect: Rect::sized(self.rect.left + x, self.rect.top + y, w, h),
            buffer: &mut *self.buffer,
        }
    }
}

fn blank_rows(width: usize, height: usize, fill: &str) -> Vec<Vec<Pixel>> {
    (0..height)
        .map(|_| (0..width).map(|_| Pixel::new(fill, Style::default())).collect())
        .collect()
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Accumulates the diff, eliding cursor moves and style switches that are already in effect.
#[derive(Default)]
struct DiffWriter {
    buf: String,
    cursor: Option<(usize, usize)>,
    active: Style,
    emitted: usize,
}

impl DiffWriter {
    fn pixel(&mut self, row: usize, col: usize, pixel: &Pixel) {
        if pixel.is_continuation() {
            return;
        }
        if self.cursor != Some((row, col)) {
            let _ = write!(self.buf, "\x1b[{};{}H", row + 1, col + 1);
        }
        if pixel.style != self.active {
            if !self.active.is_empty() {
                self.buf.push_str(RESET);
            }
            self.buf.push_str(&pixel.style.ansi());
            self.active = pixel.style;
        }
        self.buf.push_str(&pixel.symbol);
        self.cursor = Some((row, col + UnicodeWidthStr::width(pixel.symbol.as_str())));
        self.emitted += 1;
    }

    fn finish(mut self) -> String {
        if !self.active.is_empty() {
            self.buf.push_str(RESET);
        }
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::Buffer;
    use crate::core::output::{encode, TerminalCmd};
    use crate::core::style::{ColorCode, Style};
    use crate::platform::MemoryTerminal;

    #[test]
    fn first_render_emits_every_cell() {
        let mut buffer = Buffer::new(2, 2);
        buffer.set(0, 0, "a", Style::default());
        assert_eq!(buffer.render(), "\x1b[1;1Ha \x1b[2;1H  ");
    }

    #[test]
    fn cached_frame_renders_only_changes() {
        let mut buffer = Buffer::new(4, 2);
        buffer.cache();
        buffer.set(1, 0, "x", Style::default());
        buffer.set(2, 0, "y", Style::default());
        buffer.set(3, 1, "z", Style::default());
        assert_eq!(buffer.render(), "\x1b[1;2Hxy\x1b[2;4Hz");
    }

    #[test]
    fn unchanged_frame_renders_nothing() {
        let mut buffer = Buffer::new(3, 3);
        buffer.cache();
        assert_eq!(buffer.render(), "");
    }

    #[test]
    fn style_switches_reset_between_runs() {
        let red = Style::default().fg(ColorCode::RED);
        let mut buffer = Buffer::new(3, 1);
        buffer.cache();
        buffer.set(0, 0, "r", red);
        buffer.set(1, 0, "r", red);
        buffer.set(2, 0, "p", Style::default());
        assert_eq!(buffer.render(), "\x1b[1;1H\x1b[31mrr\x1b[0mp");
    }

    #[test]
    fn wide_graphemes_skip_continuation_cells() {
        let mut buffer = Buffer::new(3, 1);
        buffer.cache();
        buffer.set(0, 0, "界", Style::default());
        buffer.set(1, 0, "", Style::default());
        buffer.set(2, 0, "!", Style::default());
        assert_eq!(buffer.render(), "\x1b[1;1H界!");
    }

    #[test]
    fn frame_parks_cursor_and_caches() {
        let mut buffer = Buffer::new(2, 1);
        let cmds = buffer.frame(None);
        assert_eq!(
            cmds,
            vec![
                TerminalCmd::Bytes("\x1b[1;1H  ".to_string()),
                TerminalCmd::MoveTo { row: 1, col: 2 },
                TerminalCmd::ResetStyle,
            ]
        );
        assert_eq!(encode(&buffer.frame(Some((1, 1)))), "\x1b[1;1H\x1b[0m");
    }

    #[test]
    fn clear_erases_screen_and_repaints() {
        let mut buffer = Buffer::new(1, 1);
        buffer.set(0, 0, "q", Style::default());
        buffer.frame(None);
        buffer.clear();
        assert_eq!(buffer.render(), "\x1b[1;1H ");
        assert_eq!(
            buffer.frame(None),
            [
                TerminalCmd::ClearScreen,
                TerminalCmd::bytes("\x1b[1;1H "),
                TerminalCmd::MoveTo { row: 1, col: 1 },
                TerminalCmd::ResetStyle,
            ]
        );
        assert_eq!(buffer.render(), "");
        assert_eq!(buffer.frame(None)[0], TerminalCmd::MoveTo { row: 1, col: 1 });
    }

    #[test]
    fn resize_grows_with_fill_and_truncates() {
        let mut buffer = Buffer::with_fill(2, 2, ".");
        buffer.resize(Some(4), None);
        assert_eq!((buffer.width(), buffer.height()), (4, 2));
        assert!(buffer.rows().all(|row| row.len() == 4));
        assert_eq!(buffer[1][3].symbol, ".");

        buffer.resize(Some(1), Some(3));
        assert_eq!((buffer.width(), buffer.height()), (1, 3));
        assert!(buffer.rows().all(|row| row.len() == 1));
    }

    #[test]
    fn sub_view_writes_into_parent() {
        let mut buffer = Buffer::new(5, 4);
        {
            let mut view = buffer.sub(1, 1, 10, 2);
            assert_eq!((view.width(), view.height()), (4, 2));
            assert!(view.set(0, 0, "a", Style::default()));
            assert!(!view.set(4, 0, "b", Style::default()));
            let mut inner = view.sub(2, 1, 5, 5);
            assert_eq!((inner.width(), inner.height()), (2, 1));
            inner.fill("#", Style::default());
        }
        assert_eq!(buffer[1][1].symbol, "a");
        assert_eq!(buffer[2][3].symbol, "#");
        assert_eq!(buffer[2][4].symbol, "#");
        assert_eq!(buffer[2][2].symbol, " ");
    }

    #[test]
    fn sub_origin_outside_is_empty() {
        let mut buffer = Buffer::new(3, 3);
        let view = buffer.sub(9, 9, 2, 2);
        assert_eq!((view.width(), view.height()), (0, 0));
    }

    #[test]
    fn write_flushes_once_through_gate() {
        let mut term = MemoryTerminal::new(2, 1);
        let mut buffer = Buffer::for_terminal(&term);
        buffer.set(1, 0, "k", Style::default());
        buffer.write(&mut term, None);
        assert_eq!(term.writes(), ["\x1b[1;1H k\x1b[1;2H\x1b[0m"]);
    }

    #[test]
    fn unknown_terminal_size_falls_back_to_default() {
        let buffer = Buffer::for_terminal(&MemoryTerminal::new(0, 0));
        assert_eq!((buffer.width(), buffer.height()), (80, 24));
        let buffer = Buffer::for_terminal(&MemoryTerminal::new(30, 0));
        assert_eq!((buffer.width(), buffer.height()), (30, 24));
    }

    #[test]
    fn display_renders_styled_rows() {
        let mut buffer = Buffer::new(1, 2);
        buffer.set(0, 1, "z", Style::default().bold());
        assert_eq!(buffer.to_string(), " \x1b[0m\n\x1b[1mz\x1b[0m");
    }
}
