// Toxicity classification — model loading, inference and the serving facade.
//
// `ClassifierService` is what the rest of the application holds. It owns the
// vocabulary and whichever model the loader resolved (a full ONNX graph, or
// an LSTM rebuilt from a weights-only file), and scores text through the
// `ToxicityScorer` trait.

pub mod error;
pub mod loader;
pub mod lstm;
pub mod neighbors;
pub mod onnx;
pub mod service;
pub mod traits;
pub mod weights;
