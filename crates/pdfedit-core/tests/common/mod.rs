//! Shared helpers for pdfedit-core integration tests

#![allow(dead_code)]

pub mod fixtures;
