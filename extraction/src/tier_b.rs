//! Tier B: micro-window selection feeding Tier C. See spec §4.4.

pub mod window_selector;
