// Lexical normalization — the first stage of the classification pipeline.
//
// Raw post text goes in, a cleaned string of lemmatized content words comes
// out. The sequence encoder (see `vocab::encoder`) only splits on whitespace,
// so everything it receives must already have been through `Normalizer::clean`.

pub mod lemmatizer;
pub mod normalizer;
pub mod tokenize;
