//! End-to-end passes through the public facade: manifest to container to
//! dump, across schemas.

#[path = "../common/mod.rs"]
mod common;

mod build;
mod capture;
mod convert;
