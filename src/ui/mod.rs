/// Terminal-facing side: input sources, the paint contract, and the renderer.

pub mod gamepad;
pub mod input;
pub mod paint;
pub mod renderer;
