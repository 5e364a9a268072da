mod maxrects;
mod rect;

pub use maxrects::MaxRectsPacker;
pub use rect::Rect;
