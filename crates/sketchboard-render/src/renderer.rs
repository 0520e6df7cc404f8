//! Renderer trait abstraction.

use crate::scene::{self, Scene};
use kurbo::Size;
use peniko::Color;
use sketchboard_core::Board;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The board to render.
    pub board: &'a Board,
    /// Screen size in pixels.
    pub screen_size: Size,
    /// Background color.
    pub background_color: Color,
    /// Grid line color.
    pub grid_color: Color,
    /// Whether to draw the background grid.
    pub show_grid: bool,
    /// Selection outline, lasso and handle border color.
    pub selection_color: Color,
    /// Handle dot fill.
    pub handle_fill: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(board: &'a Board, screen_size: Size) -> Self {
        Self {
            board,
            screen_size,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            grid_color: Color::from_rgba8(200, 200, 200, 100),
            show_grid: true,
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            handle_fill: Color::WHITE,
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the grid color.
    pub fn with_grid_color(mut self, color: Color) -> Self {
        self.grid_color = color;
        self
    }

    /// Show or hide the grid.
    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    /// Set the selection color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Check that the frame has something to draw into.
    pub fn validate(&self) -> RenderResult<()> {
        let Size { width, height } = self.screen_size;
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(RendererError::Surface(format!(
                "invalid screen size {}x{}",
                width, height
            )));
        }
        Ok(())
    }
}

/// Renderer trait for drawing a board.
pub trait Renderer: Send + Sync {
    /// Build the frame for the given context.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color for clearing.
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Reference backend that keeps the last built [`Scene`].
#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    scene: Scene,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last built scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take the last built scene, leaving an empty one.
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        ctx.validate()?;
        self.scene = scene::build(ctx);
        log::debug!("Built scene with {} commands", self.scene.len());
        Ok(())
    }
}
