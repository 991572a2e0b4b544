//! Setup module for the disc-morph application.
//!
//! Holds the pipeline that turns a snapshot series into frames.

pub mod execution;
