pub mod pipeline;
pub mod triangulation;
