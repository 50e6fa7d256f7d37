#![allow(dead_code)]

pub mod builders;

pub use builders::network::{ProcFixture, TestNetworkBuilder};
