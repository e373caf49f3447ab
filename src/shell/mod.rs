// Composition root for the products outbox worker.
//
// Responsibilities:
// - Read config from environment.
// - Instantiate concrete infrastructure implementations.
// - Wire implementations into the outbox sweeper.
// - Run the sweeper on its schedule until shutdown.

pub mod config;
pub mod workers;
