// Purpose: the single-note voice the engine's pool is made of.

pub mod voice;

pub use voice::Voice;
