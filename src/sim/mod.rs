pub mod event;
pub mod food;
pub mod save;
pub mod scores;
pub mod step;
pub mod world;
