pub mod ai;
pub mod collision;
pub mod entity;
pub mod geometry;
pub mod human;
pub mod keys;
pub mod vision;
