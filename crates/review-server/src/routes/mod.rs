pub mod assets;
pub mod batch;
pub mod events;
pub mod purge;
pub mod state;
