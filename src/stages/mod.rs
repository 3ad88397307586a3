pub mod stage0_extract;
pub mod stage1_aggregate;
pub mod stage2_render;

pub use stage0_extract::*;
pub use stage1_aggregate::*;
pub use stage2_render::*;
