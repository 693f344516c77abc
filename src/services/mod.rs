pub mod confirmer;
pub mod renderer;

pub use confirmer::{confirm_prompt, stdin_lines, AutoConfirmer, Confirmer, SharedInput, StdinConfirmer};
pub use renderer::{split_segments, Renderer, Segment, TerminalRenderer};
