//! Batch loops driving the evaluator.

pub mod window_loop;
