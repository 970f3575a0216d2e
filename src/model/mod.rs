pub mod access_point;
pub mod position;
