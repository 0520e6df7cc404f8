//! Display list built from a board for one frame.
//!
//! Commands are in canvas coordinates; backends apply [`Scene::transform`]
//! to reach the screen. Overlay widths are divided by the viewport scale so
//! they stay the same on-screen size at any zoom.

use crate::renderer::RenderContext;
use kurbo::{Affine, BezPath, Point, Rect, Shape};
use peniko::Color;
use sketchboard_core::transform::get_handles;
use sketchboard_core::{DrawIntent, ItemHandle};
use std::fmt;

/// One drawing operation.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Fill the whole surface.
    Clear(Color),
    /// A background grid line.
    GridLine {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    },
    Stroke {
        path: BezPath,
        color: Color,
        width: f64,
        /// Dash length; gaps are the same length.
        dash: Option<f64>,
    },
    Fill {
        path: BezPath,
        color: Color,
    },
    Text {
        content: String,
        position: Point,
        font_size: f64,
        color: Color,
    },
    /// A resize handle marker.
    HandleDot {
        center: Point,
        radius: f64,
        fill: Color,
        border: Color,
    },
}

impl From<DrawIntent> for DrawCommand {
    fn from(intent: DrawIntent) -> Self {
        match intent {
            DrawIntent::Stroke { path, color, width } => DrawCommand::Stroke {
                path,
                color: color.into(),
                width,
                dash: None,
            },
            DrawIntent::Fill { path, color } => DrawCommand::Fill {
                path,
                color: color.into(),
            },
            DrawIntent::Text {
                content,
                position,
                font_size,
                color,
            } => DrawCommand::Text {
                content,
                position,
                font_size,
                color: color.into(),
            },
        }
    }
}

fn hex(color: Color) -> String {
    let c = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
}

fn fmt_rect(rect: Rect) -> String {
    format!("({:.1}, {:.1})-({:.1}, {:.1})", rect.x0, rect.y0, rect.x1, rect.y1)
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCommand::Clear(color) => write!(f, "clear {}", hex(*color)),
            DrawCommand::GridLine { from, to, .. } => write!(
                f,
                "grid ({:.1}, {:.1})-({:.1}, {:.1})",
                from.x, from.y, to.x, to.y
            ),
            DrawCommand::Stroke {
                path,
                color,
                width,
                dash,
            } => {
                write!(
                    f,
                    "stroke {} width {:.2} {}",
                    fmt_rect(path.bounding_box()),
                    width,
                    hex(*color)
                )?;
                if dash.is_some() {
                    write!(f, " dashed")?;
                }
                Ok(())
            }
            DrawCommand::Fill { path, color } => {
                write!(f, "fill {} {}", fmt_rect(path.bounding_box()), hex(*color))
            }
            DrawCommand::Text {
                content,
                position,
                font_size,
                color,
            } => write!(
                f,
                "text {:?} at ({:.1}, {:.1}) size {:.1} {}",
                content,
                position.x,
                position.y,
                font_size,
                hex(*color)
            ),
            DrawCommand::HandleDot { center, radius, .. } => write!(
                f,
                "handle ({:.1}, {:.1}) radius {:.1}",
                center.x, center.y, radius
            ),
        }
    }
}

/// An ordered list of draw commands plus the canvas-to-screen transform.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub transform: Affine,
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new(transform: Affine) -> Self {
        Self {
            transform,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

/// Build the display list for one frame.
pub fn build(ctx: &RenderContext) -> Scene {
    let viewport = ctx.board.viewport();
    let visible = viewport.visible_rect(ctx.screen_size);
    let mut scene = Scene::new(viewport.transform());

    scene.push(DrawCommand::Clear(ctx.background_color));
    if ctx.show_grid {
        push_grid(&mut scene, ctx, visible);
    }

    for handle in ctx.board.visible_items(visible) {
        scene.push(handle.draw_intent().into());
    }

    push_in_progress(&mut scene, ctx);
    push_selection(&mut scene, ctx, visible);
    scene
}

/// Grid lines covering `visible`, snapped outward to the grid spacing.
fn push_grid(scene: &mut Scene, ctx: &RenderContext, visible: Rect) {
    let width = 1.0 / ctx.board.viewport().scale;
    for (from, to) in grid_lines(visible, ctx.board.config().grid_size) {
        scene.push(DrawCommand::GridLine {
            from,
            to,
            color: ctx.grid_color,
            width,
        });
    }
}

/// Vertical then horizontal line segments. Empty unless `grid_size` is
/// positive and finite.
fn grid_lines(visible: Rect, grid_size: f64) -> Vec<(Point, Point)> {
    if !grid_size.is_finite() || grid_size <= 0.0 {
        return Vec::new();
    }
    let start_x = (visible.x0 / grid_size).floor() * grid_size;
    let start_y = (visible.y0 / grid_size).floor() * grid_size;
    let end_x = (visible.x1 / grid_size).ceil() * grid_size;
    let end_y = (visible.y1 / grid_size).ceil() * grid_size;

    let mut lines = Vec::new();

    // Vertical lines
    let mut x = start_x;
    while x <= end_x {
        lines.push((Point::new(x, start_y), Point::new(x, end_y)));
        x += grid_size;
    }

    // Horizontal lines
    let mut y = start_y;
    while y <= end_y {
        lines.push((Point::new(start_x, y), Point::new(end_x, y)));
        y += grid_size;
    }
    lines
}

/// The path, shape or lasso stroke currently being drawn.
fn push_in_progress(scene: &mut Scene, ctx: &RenderContext) {
    let tools = ctx.board.tools();
    let scale = ctx.board.viewport().scale;

    if let Some(path) = tools.current_path().filter(|p| !p.points.is_empty()) {
        scene.push(ItemHandle::Path(path).draw_intent().into());
    }
    if let Some(shape) = tools.current_shape() {
        scene.push(ItemHandle::Shape(shape).draw_intent().into());
    }

    let lasso = tools.lasso_points();
    if lasso.len() > 1 {
        let mut path = BezPath::new();
        path.move_to(lasso[0]);
        for point in &lasso[1..] {
            path.line_to(*point);
        }
        scene.push(DrawCommand::Stroke {
            path,
            color: ctx.selection_color,
            width: 2.0 / scale,
            dash: Some(8.0 / scale),
        });
    }
}

/// Dashed outline around the visible selection and its resize handles.
fn push_selection(scene: &mut Scene, ctx: &RenderContext, visible: Rect) {
    let Some(bounds) = ctx.board.visible_selection_bounds(visible) else {
        return;
    };
    let config = ctx.board.config();
    let scale = ctx.board.viewport().scale;

    scene.push(DrawCommand::Stroke {
        path: bounds.to_path(0.1),
        color: ctx.selection_color,
        width: 1.0 / scale,
        dash: Some(4.0 / scale),
    });

    let padding = config.handle_box_padding;
    let radius = config.handle_dot_radius_at(scale);
    for handle in get_handles(bounds.inflate(padding, padding)) {
        scene.push(DrawCommand::HandleDot {
            center: handle.position,
            radius,
            fill: ctx.handle_fill,
            border: ctx.selection_color,
        });
    }
}
