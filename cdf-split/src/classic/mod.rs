//! Reading and writing of netCDF classic files (the CDF-1 and 64-bit offset CDF-2 formats).
mod error;
mod header;
mod reader;
mod writer;
mod xdr;

pub use error::{ClassicError, ClassicResult};
pub use header::Version;
pub use reader::ClassicReader;
pub use writer::{ClassicEncoder, encode, encoded_len};
