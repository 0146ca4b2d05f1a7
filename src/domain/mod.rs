pub mod board;
pub mod drag;
pub mod id;
pub mod reducer;

pub use board::{Board, Card, Comment, List};
pub use drag::{DragIntent, DragNode, DragTracker};
pub use id::IdMinter;
pub use reducer::{CardPatch, ListPatch};
