pub mod frame;
pub mod ttn;
