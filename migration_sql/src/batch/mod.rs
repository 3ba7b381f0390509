pub mod parser;
pub mod range;
pub mod token;

pub use parser::{BatchKind, BatchParser, Batches, Separator, SqlBatch};
pub use range::{
    DuplicateEscapedRange, EndCode, LineReader, NestingMultiLineComment, NoEscapeRange,
    RangeSearcher, SingleLineComment,
};
pub use token::{SpecialToken, SpecialTokenSearcher};
