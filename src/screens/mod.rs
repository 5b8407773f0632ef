// src/screens/mod.rs

pub mod auth;
pub mod course;
pub mod discussion;
pub mod material;
pub mod quiz;
