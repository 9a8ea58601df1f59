mod access;
pub use access::*;
