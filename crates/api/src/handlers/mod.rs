pub mod map;
pub mod spots;
