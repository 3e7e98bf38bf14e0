mod block;
pub mod consts;

pub use block::Block;
