pub mod page_extractor;

pub use page_extractor::{
    tokenize, ExtractedHeading, ExtractedImage, ParsedDocument,
};
