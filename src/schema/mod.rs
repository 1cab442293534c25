pub mod mood;
pub mod poem;
