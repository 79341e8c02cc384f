//! Knowledge base corpus: immutable (document, embedding) snapshot with a load-once cache

pub mod store;

pub use store::{Corpus, CorpusDocument, CorpusSnapshot, CorpusStore, SnapshotFile};
