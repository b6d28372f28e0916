//! The simulator under test.

/// Command-line construction and process supervision for the simulator.
pub mod invoker;

pub use invoker::SimulatorInvoker;
