#![doc = include_str!("../README.md")]
#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;
pub mod vec;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
