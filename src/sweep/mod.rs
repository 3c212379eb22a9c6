pub mod enumerator;
pub mod sequencer;
pub mod record;
pub mod orchestrator;
