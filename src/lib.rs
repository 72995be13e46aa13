// bullyscreen: cyberbullying screening for user posts
//
// This is the library root. Each module corresponds to a stage of the
// classification pipeline:
//   text → vocab → toxicity → scoring

pub mod config;
pub mod output;
pub mod scoring;
pub mod status;
pub mod text;
pub mod toxicity;
pub mod vocab;
