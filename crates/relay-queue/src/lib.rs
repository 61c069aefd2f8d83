#![doc = include_str!("../README.md")]

mod queue;

pub use crate::queue::*;
