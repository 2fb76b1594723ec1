pub mod direction;
pub mod point;
pub mod snake;
