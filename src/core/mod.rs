pub mod alignment;
pub mod dna;
pub mod engine;
pub mod error;
pub mod filtering;
pub mod genome;
pub mod read;
pub mod rod;
pub mod sources;
pub mod walker;
