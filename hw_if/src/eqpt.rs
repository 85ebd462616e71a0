//! # Equipment interfaces

pub mod button;
pub mod encoder;
pub mod indicator;
pub mod line;
pub mod motor;
