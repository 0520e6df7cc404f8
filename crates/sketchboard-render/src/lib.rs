//! Sketchboard Render Library
//!
//! Renderer abstraction for sketchboard. The engine supplies draw data; a
//! backend turns a [`RenderContext`] into pixels. [`DisplayListRenderer`] is the
//! reference backend and records plain [`DrawCommand`]s.

mod renderer;
pub mod scene;

pub use renderer::{DisplayListRenderer, RenderContext, RenderResult, Renderer, RendererError};
pub use scene::{DrawCommand, Scene};
