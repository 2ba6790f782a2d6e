//! Drawing backend interface
//!
//! The driver turns each tick's entity tree into [`DrawCommand`]s and hands
//! them to a backend. Pixel output lives outside this crate; backends must not
//! mutate entity state, and their errors are logged by the driver rather than
//! propagated into the runtime.

pub mod commands;
pub mod recording;

pub use commands::{DrawCommand, collision_bound_commands, entity_commands, tree_commands};
pub use recording::RecordingBackend;

/// Something that can paint draw commands onto a surface
pub trait DrawBackend {
    type Error: std::fmt::Debug;

    /// Whether the surface exists yet; it is created lazily on the first tick
    fn has_surface(&self) -> bool;

    fn create_surface(&mut self, width: u32, height: u32);

    /// Clear the surface before a frame
    fn begin_frame(&mut self);

    fn draw(&mut self, command: &DrawCommand) -> Result<(), Self::Error>;

    fn end_frame(&mut self) {}
}
