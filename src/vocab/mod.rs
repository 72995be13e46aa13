// Vocabulary index and sequence encoding.
//
// The vocabulary maps cleaned tokens to the integer ids the classifier's
// embedding table was trained on. The encoder turns a batch of cleaned
// strings into the fixed-width id matrix the model consumes.

pub mod encoder;
pub mod vocabulary;
