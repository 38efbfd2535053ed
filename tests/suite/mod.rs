//! Integration test modules.

mod boundary_lifecycle;
mod escalation;
mod runtime_loop;
