pub mod page_parser;
pub mod reference;
pub mod transcript_store;

pub use page_parser::{MetaLayout, PageOutcome, PageParser, ParsedPage};
pub use reference::{CollegeDirectory, ReferenceResolvers};
pub use transcript_store::{JsonFileStore, MemoryStore, TranscriptStore};
