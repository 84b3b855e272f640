// src/lib.rs

//! newslaunch: Guardian article search published to Kinesis

pub mod config;
pub mod error;
pub mod lambda;
pub mod models;
pub mod services;
pub mod stream;
pub mod utils;
