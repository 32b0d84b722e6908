//! Curved, looping navigation banner for the portfolio.

pub mod config;
pub mod events;
pub mod gui;
pub mod sys;
