//! Module system for codebuddy

pub mod assist;
