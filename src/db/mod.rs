mod tag;
mod memory;
pub use self::{
  tag::*,
  memory::*,
};

mod service;
pub use service::*;
