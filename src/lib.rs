#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod error;
pub mod validation;
pub mod config;
pub mod model;
pub mod db;
pub mod hierarchy;
pub mod ops;
pub mod queries;
pub mod ai;
pub mod transfer;
pub mod cli;
