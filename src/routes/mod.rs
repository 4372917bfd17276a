//! Route handlers outside the pricing module

pub mod health;
