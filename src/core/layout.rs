//! Row-based flow layout over fixed-size pages.
//!
//! Content is emitted as fixed-height rows. The engine owns the page list and
//! the [`LayoutCursor`] for one render call, opens a new page whenever the next
//! row would cross the break line, and runs the injected [`PageDecorator`]
//! hooks around every page.

use super::encoding::WinAnsiText;
use super::fonts::FontFace;
use super::pdf::mm_to_pt;
use crate::domain::ports::PageDecorator;
use crate::utils::error::RenderError;
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};
use tracing::debug;

/// Tolerance for row heights that land exactly on the break line.
const FIT_EPSILON_MM: f32 = 1e-3;

/// Position in the logical flow: vertical offset from the top edge of the
/// current page, and that page's 1-based number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub y: f32,
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_left_mm: f32,
    pub content_width_mm: f32,
    pub break_line_mm: f32,
    pub line_width_mm: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStyle {
    pub font: FontFace,
    pub size_pt: f32,
    pub align: Align,
    pub border: bool,
    /// Gray fill level behind the cell, if any.
    pub fill: Option<f32>,
    pub padding_mm: f32,
}

impl CellStyle {
    pub fn text(font: FontFace, size_pt: f32, padding_mm: f32) -> Self {
        Self {
            font,
            size_pt,
            align: Align::Left,
            border: false,
            fill: None,
            padding_mm,
        }
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn bordered(mut self) -> Self {
        self.border = true;
        self
    }

    pub fn filled(mut self, gray: f32) -> Self {
        self.fill = Some(gray);
        self
    }
}

/// Drawing surface for one physical page. Coordinates are millimetres from
/// the top-left corner; conversion to PDF user space happens here.
#[derive(Debug, Clone)]
pub struct PageCanvas {
    width_mm: f32,
    height_mm: f32,
    operations: Vec<Operation>,
}

impl PageCanvas {
    pub fn new(width_mm: f32, height_mm: f32, line_width_mm: f32) -> Self {
        Self {
            width_mm,
            height_mm,
            operations: vec![Operation::new("w", vec![Object::Real(mm_to_pt(line_width_mm))])],
        }
    }

    pub fn width_mm(&self) -> f32 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f32 {
        self.height_mm
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    /// Draws a `w` x `h` cell at (`x`, `y`) with optional frame, fill and
    /// single-line text. The text baseline sits at mid-height of the cell.
    pub fn cell(&mut self, x: f32, y: f32, w: f32, h: f32, text: &WinAnsiText, style: &CellStyle) {
        let page_height = self.height_mm;
        let rect = || {
            vec![
                Object::Real(mm_to_pt(x)),
                Object::Real(mm_to_pt(page_height - y - h)),
                Object::Real(mm_to_pt(w)),
                Object::Real(mm_to_pt(h)),
            ]
        };

        match (style.fill, style.border) {
            (Some(gray), border) => {
                let rect = rect();
                self.operations
                    .push(Operation::new("g", vec![Object::Real(gray)]));
                self.operations.push(Operation::new("re", rect));
                self.operations
                    .push(Operation::new(if border { "B" } else { "f" }, vec![]));
                self.operations
                    .push(Operation::new("g", vec![Object::Real(0.0)]));
            }
            (None, true) => {
                let rect = rect();
                self.operations.push(Operation::new("re", rect));
                self.operations.push(Operation::new("S", vec![]));
            }
            (None, false) => {}
        }

        if text.is_empty() {
            return;
        }

        let text_width = style.font.text_width_mm(text, style.size_pt);
        let text_x = match style.align {
            Align::Left => x + style.padding_mm,
            Align::Center => x + (w - text_width) / 2.0,
            Align::Right => x + w - style.padding_mm - text_width,
        };
        let size_mm = style.size_pt * 25.4 / 72.0;
        let baseline = y + 0.5 * h + 0.3 * size_mm;

        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(style.font.resource_name().as_bytes().to_vec()),
                    Object::Real(style.size_pt),
                ],
            ),
            Operation::new(
                "Td",
                vec![
                    Object::Real(mm_to_pt(text_x)),
                    Object::Real(mm_to_pt(self.height_mm - baseline)),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }
}

pub struct LayoutEngine<'d, D: PageDecorator + ?Sized> {
    geometry: PageGeometry,
    decorator: &'d D,
    pages: Vec<PageCanvas>,
    cursor: LayoutCursor,
}

impl<'d, D: PageDecorator + ?Sized> LayoutEngine<'d, D> {
    /// Opens page 1 and runs the start hook on it.
    pub fn start(geometry: PageGeometry, decorator: &'d D) -> Result<Self, RenderError> {
        let mut engine = Self {
            geometry,
            decorator,
            pages: Vec::new(),
            cursor: LayoutCursor { y: 0.0, page: 0 },
        };
        engine.open_page()?;
        Ok(engine)
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether a block of `height` still fits above the break line.
    pub fn fits(&self, height: f32) -> bool {
        self.cursor.y + height <= self.geometry.break_line_mm + FIT_EPSILON_MM
    }

    /// Closes the current page and opens the next one.
    pub fn break_page(&mut self) -> Result<(), RenderError> {
        self.close_page()?;
        self.open_page()?;
        debug!(page = self.cursor.page, y = self.cursor.y, "page break");
        Ok(())
    }

    /// Breaks the page unless `height` fits. Returns whether a break happened.
    pub fn ensure_room(&mut self, height: f32) -> Result<bool, RenderError> {
        if self.fits(height) {
            return Ok(false);
        }
        self.break_page()?;
        if !self.fits(height) {
            return Err(RenderError::layout(format!(
                "a {height} mm block does not fit on an empty page (content area ends at {} mm, starts at {} mm)",
                self.geometry.break_line_mm, self.cursor.y
            )));
        }
        Ok(true)
    }

    /// Emits one row of `height`, breaking the page first when needed.
    /// `draw` receives the page and the row's top edge.
    pub fn row<F>(&mut self, height: f32, draw: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut PageCanvas, f32),
    {
        self.ensure_room(height)?;
        let y = self.cursor.y;
        draw(self.current_page()?, y);
        self.cursor.y += height;
        Ok(())
    }

    /// Vertical gap. Never starts a page on its own; a following row that no
    /// longer fits does.
    pub fn advance(&mut self, gap: f32) {
        self.cursor.y += gap;
    }

    /// Runs the end hook on the last page and hands back every page.
    pub fn finish(mut self) -> Result<Vec<PageCanvas>, RenderError> {
        self.close_page()?;
        Ok(self.pages)
    }

    fn current_page(&mut self) -> Result<&mut PageCanvas, RenderError> {
        self.pages
            .last_mut()
            .ok_or_else(|| RenderError::layout("no open page"))
    }

    fn open_page(&mut self) -> Result<(), RenderError> {
        self.pages.push(PageCanvas::new(
            self.geometry.width_mm,
            self.geometry.height_mm,
            self.geometry.line_width_mm,
        ));
        self.cursor = LayoutCursor {
            y: 0.0,
            page: self.cursor.page + 1,
        };
        let decorator = self.decorator;
        let mut cursor = self.cursor;
        decorator.on_page_start(self.current_page()?, &mut cursor)?;
        self.cursor = cursor;
        Ok(())
    }

    fn close_page(&mut self) -> Result<(), RenderError> {
        let decorator = self.decorator;
        let cursor = self.cursor;
        decorator.on_page_end(self.current_page()?, &cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PageHooks;
    use std::cell::RefCell;

    fn geometry() -> PageGeometry {
        PageGeometry {
            width_mm: 100.0,
            height_mm: 100.0,
            margin_left_mm: 10.0,
            content_width_mm: 80.0,
            break_line_mm: 80.0,
            line_width_mm: 0.2,
        }
    }

    fn text_operands(canvas: &PageCanvas) -> Vec<Vec<u8>> {
        canvas
            .operations()
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn hooks_fire_once_per_page_in_order() {
        let events = RefCell::new(Vec::new());
        let hooks = PageHooks::new(
            |_: &mut PageCanvas, cursor: &mut LayoutCursor| {
                events.borrow_mut().push(format!("start {}", cursor.page));
                cursor.y = 20.0;
                Ok(())
            },
            |_: &mut PageCanvas, cursor: &LayoutCursor| {
                events.borrow_mut().push(format!("end {}", cursor.page));
                Ok(())
            },
        );

        let mut engine = LayoutEngine::start(geometry(), &hooks).unwrap();
        assert_eq!(engine.cursor(), LayoutCursor { y: 20.0, page: 1 });

        // 60 mm of room: six 10 mm rows fill page 1, the seventh opens page 2.
        for _ in 0..7 {
            engine.row(10.0, |_, _| {}).unwrap();
        }
        assert_eq!(engine.cursor(), LayoutCursor { y: 30.0, page: 2 });

        let pages = engine.finish().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(
            events.into_inner(),
            vec!["start 1", "end 1", "start 2", "end 2"]
        );
    }

    #[test]
    fn row_exactly_at_break_line_stays_on_page() {
        let hooks = PageHooks::new(
            |_: &mut PageCanvas, cursor: &mut LayoutCursor| {
                cursor.y = 20.0;
                Ok(())
            },
            |_: &mut PageCanvas, _: &LayoutCursor| Ok(()),
        );
        let mut engine = LayoutEngine::start(geometry(), &hooks).unwrap();
        engine.row(60.0, |_, _| {}).unwrap();
        assert_eq!(engine.page_count(), 1);
        assert!(engine.ensure_room(0.5).unwrap());
        assert_eq!(engine.page_count(), 2);
    }

    #[test]
    fn oversized_row_is_a_layout_failure() {
        let hooks = PageHooks::new(
            |_: &mut PageCanvas, cursor: &mut LayoutCursor| {
                cursor.y = 20.0;
                Ok(())
            },
            |_: &mut PageCanvas, _: &LayoutCursor| Ok(()),
        );
        let mut engine = LayoutEngine::start(geometry(), &hooks).unwrap();
        let err = engine.row(70.0, |_, _| {}).unwrap_err();
        assert!(matches!(err, RenderError::Layout { .. }));
    }

    #[test]
    fn advance_does_not_break_the_page() {
        let hooks = PageHooks::new(
            |_: &mut PageCanvas, _: &mut LayoutCursor| Ok(()),
            |_: &mut PageCanvas, _: &LayoutCursor| Ok(()),
        );
        let mut engine = LayoutEngine::start(geometry(), &hooks).unwrap();
        engine.advance(95.0);
        assert_eq!(engine.page_count(), 1);
        assert!(!engine.fits(1.0));
    }

    #[test]
    fn cell_draws_frame_and_text() {
        let mut canvas = PageCanvas::new(100.0, 100.0, 0.2);
        let text = WinAnsiText::encode("test", "Total").unwrap();
        let style = CellStyle::text(FontFace::Bold, 10.0, 1.0)
            .aligned(Align::Right)
            .bordered();
        canvas.cell(10.0, 10.0, 50.0, 7.0, &text, &style);

        let operators: Vec<&str> = canvas
            .operations()
            .iter()
            .map(|op| op.operator.as_str())
            .collect();
        assert_eq!(operators, vec!["w", "re", "S", "BT", "Tf", "Td", "Tj", "ET"]);
        assert_eq!(text_operands(&canvas), vec![b"Total".to_vec()]);
    }

    #[test]
    fn filled_cell_restores_black() {
        let mut canvas = PageCanvas::new(100.0, 100.0, 0.2);
        let text = WinAnsiText::encode("test", "Executive Summary").unwrap();
        let style = CellStyle::text(FontFace::Bold, 12.0, 1.0).filled(0.9);
        canvas.cell(10.0, 10.0, 80.0, 8.0, &text, &style);

        let operators: Vec<&str> = canvas
            .operations()
            .iter()
            .map(|op| op.operator.as_str())
            .collect();
        assert_eq!(
            operators,
            vec!["w", "g", "re", "f", "g", "BT", "Tf", "Td", "Tj", "ET"]
        );
    }
}
