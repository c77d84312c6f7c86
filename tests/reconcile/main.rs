//! Integration tests for optimistic reconciliation through containers.

mod containers;
mod properties;
mod scenarios;
