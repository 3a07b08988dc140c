//! Filesystem utilities for highlander.
//!
//! Lock directories are claimed with a plain `create_dir`; this module
//! provides the write side, publishing a file so that readers never observe
//! it partially written.

pub mod atomic;

pub use atomic::publish_new;
