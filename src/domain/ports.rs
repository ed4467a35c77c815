use crate::core::layout::{LayoutCursor, PageCanvas};
use crate::utils::error::{RenderError, Result};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

/// Page-lifecycle hooks run by the layout engine.
///
/// `on_page_start` fires right after a physical page is opened, the first one
/// included, and must leave `cursor.y` at the top of the content area.
/// `on_page_end` fires once the page is complete, the last one included.
pub trait PageDecorator {
    fn on_page_start(
        &self,
        canvas: &mut PageCanvas,
        cursor: &mut LayoutCursor,
    ) -> std::result::Result<(), RenderError>;

    fn on_page_end(
        &self,
        canvas: &mut PageCanvas,
        cursor: &LayoutCursor,
    ) -> std::result::Result<(), RenderError>;
}

/// Adapts a pair of closures into a [`PageDecorator`].
pub struct PageHooks<S, E> {
    start: S,
    end: E,
}

impl<S, E> PageHooks<S, E>
where
    S: Fn(&mut PageCanvas, &mut LayoutCursor) -> std::result::Result<(), RenderError>,
    E: Fn(&mut PageCanvas, &LayoutCursor) -> std::result::Result<(), RenderError>,
{
    pub fn new(start: S, end: E) -> Self {
        Self { start, end }
    }
}

impl<S, E> PageDecorator for PageHooks<S, E>
where
    S: Fn(&mut PageCanvas, &mut LayoutCursor) -> std::result::Result<(), RenderError>,
    E: Fn(&mut PageCanvas, &LayoutCursor) -> std::result::Result<(), RenderError>,
{
    fn on_page_start(
        &self,
        canvas: &mut PageCanvas,
        cursor: &mut LayoutCursor,
    ) -> std::result::Result<(), RenderError> {
        (self.start)(canvas, cursor)
    }

    fn on_page_end(
        &self,
        canvas: &mut PageCanvas,
        cursor: &LayoutCursor,
    ) -> std::result::Result<(), RenderError> {
        (self.end)(canvas, cursor)
    }
}
