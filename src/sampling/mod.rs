pub mod block_length;
pub mod bootstrap;
pub mod historical;
pub mod paths;
