//! Text codec for Final Fantasy Tactics disc images: the character maps of
//! the PSX and PSP releases and the LZ-style compression used by the
//! larger text files.

pub mod charmap;
pub mod compression;
pub mod error;
pub mod jump_table;
pub mod text_block;
pub mod words;

pub use charmap::{CharMap, CharMapKind};
pub use compression::{Pointer, compress, decompress};
pub use error::{Error, Result};
pub use text_block::{TextBlock, decode_list, encode_list};
