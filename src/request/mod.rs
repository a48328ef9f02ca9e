pub mod hint;
pub mod parser;

pub use hint::take_resizing_hint;
pub use parser::{parse, ParsedRequest};
