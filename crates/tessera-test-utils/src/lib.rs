//! Test utilities for Tessera development.
//!
//! Provides small cell kernels with easily predicted results, a closure
//! backed [`Initializer`](tessera_engine::Initializer), and scripted
//! collaborators (balancers, steerers) for driving the stepper through
//! specific scenarios. See [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    role_for, BrokenBalancer, CountingKernel, FnInitializer, IdentityKernel, PokeSteerer,
    ScriptedBalancer, ShiftKernel, SteerLog, SumKernel,
};
