use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is how the host presents a frame the machine produced. It should
/// abstract the implementation details, so a variety of kinds of screen
/// would work.
pub trait Display {
    /// draw a row-major frame, one byte per pixel, 0 or 1
    fn draw(&mut self, frame: &[u8]) -> Result<(), io::Error>;
}

/// frame geometry plus the coordinate mapping the canvas wants
struct Resolution {
    width: usize,
    height: usize,
}

impl Resolution {
    fn cell_count(&self) -> usize {
        self.width * self.height
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.width - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.height - 1) as f64, 0.0]
    }

    /// canvas coordinates of every cell holding `value`; the y axis points
    /// down in the frame and up on the canvas, hence the negation
    fn plane<'a>(&self, frame: &'a [u8], value: u8) -> impl Iterator<Item = (f64, f64)> + 'a {
        let width = self.width;
        frame.iter().enumerate().filter_map(move |(idx, &cell)| {
            if cell == value {
                Some(((idx % width) as f64, -1.0 * (idx / width) as f64))
            } else {
                None
            }
        })
    }
}

/// monochrome display in a terminal, rendered with TUI over crossterm
pub struct TermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl TermDisplay {
    pub fn new(width: usize, height: usize) -> Result<TermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(TermDisplay {
            terminal,
            resolution: Resolution { width, height },
        })
    }
}

impl Drop for TermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Display for TermDisplay {
    fn draw(&mut self, frame: &[u8]) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        assert_eq!(
            frame.len(),
            self.resolution.cell_count(),
            "TermDisplay must have one byte per pixel to draw"
        );

        let lit: Vec<(f64, f64)> = self.resolution.plane(frame, 1).collect();
        let dark: Vec<(f64, f64)> = self.resolution.plane(frame, 0).collect();
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();
        // 1:1 between chip8 pixels and terminal cells, plus the border
        let area = Rect::new(
            0,
            0,
            2 + self.resolution.width as u16,
            2 + self.resolution.height as u16,
        );

        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &dark,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, area);
        })?;
        Ok(())
    }
}

/// counts the frames it is handed; useful for testing the host loop
pub struct DummyDisplay {
    pub frames: usize,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay { frames: 0 }
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _frame: &[u8]) -> Result<(), io::Error> {
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_count() {
        let r = Resolution {
            width: 64,
            height: 32,
        };
        assert_eq!(r.cell_count(), 2048);
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution {
            width: 64,
            height: 32,
        };
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution {
            width: 64,
            height: 32,
        };
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_plane_splits_lit_from_dark() {
        let r = Resolution {
            width: 4,
            height: 2,
        };
        let frame = [1, 0, 0, 0, 0, 0, 0, 1];
        let lit: Vec<_> = r.plane(&frame, 1).collect();
        assert_eq!(lit, vec![(0.0, 0.0), (3.0, -1.0)]);
        assert_eq!(r.plane(&frame, 0).count(), 6);
    }

    #[test]
    fn test_dummy_counts_frames() {
        let mut d = DummyDisplay::new();
        d.draw(&[0; 8]).unwrap();
        d.draw(&[1; 8]).unwrap();
        assert_eq!(d.frames, 2);
    }
}
