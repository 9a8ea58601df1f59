use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
  pub name: String,
}

impl Tag {
  pub fn new<S: Into<String>>(name: S) -> Self {
    Self {
      name: name.into(),
    }
  }
}

/// Wire form of a tag: serializes as a bare string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagName(pub String);

impl From<Tag> for TagName {
  fn from(tag: Tag) -> Self {
    TagName(tag.name)
  }
}
