// Pedantic: suppress noise for internal crate code.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod app;
pub mod board;
pub mod color;
pub mod components;
pub mod config;
pub mod git;
pub mod labels;
pub mod sort;
pub mod theme;
pub mod util;
pub mod views;
