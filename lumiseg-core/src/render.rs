//! Rendering callback trait

use crate::buffer::DisplayBuffer;

/// Fills the display buffer once per refresh tick
///
/// The buffer is blank when `render` is called. Any closure taking
/// `&mut DisplayBuffer<N>` is a renderer.
pub trait Render<const N: usize> {
    /// Draw this tick's content
    fn render(&mut self, buffer: &mut DisplayBuffer<N>);
}

impl<F, const N: usize> Render<N> for F
where
    F: FnMut(&mut DisplayBuffer<N>),
{
    fn render(&mut self, buffer: &mut DisplayBuffer<N>) {
        self(buffer)
    }
}

/// Renderer type for devices without a rendering callback
///
/// Never called; it only names the type parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRender;

impl<const N: usize> Render<N> for NoRender {
    fn render(&mut self, _buffer: &mut DisplayBuffer<N>) {}
}
