// Scoring — what a classified post does to its author's standing.

pub mod reputation;
