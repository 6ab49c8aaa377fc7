pub mod clock;
pub mod driver;
pub mod event;
pub mod step;
pub mod world;
