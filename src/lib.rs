//! Supplier ESG risk tier estimation service.
//!
//! The crate trains a small multi-class classifier on a curated synthetic
//! supplier dataset and serves predictions over HTTP. The load-bearing piece
//! is the feature-engineering transform in [`risk::features`] together with
//! the frozen-schema alignment in [`risk::encoding`]: both must behave
//! identically at training and inference time.

pub mod config;
pub mod error;
pub mod http;
pub mod risk;
pub mod telemetry;
