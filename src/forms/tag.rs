use serde::{Deserialize, Serialize};

use crate::models::tag::*;

/// Response body for the tag listing.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TagListResponse {
  /// `{"tags": ["go", "rust"]}`
  Envelope {
    tags: Vec<TagName>,
  },
  /// `["go", "rust"]`
  List(Vec<TagName>),
}

impl TagListResponse {
  pub fn tags(&self) -> &[TagName] {
    match self {
      TagListResponse::Envelope { tags } => tags,
      TagListResponse::List(tags) => tags,
    }
  }
}

/// Maps stored tags into the response body.
///
/// The mapping keeps the order and multiplicity of its input; sorting is
/// left to whichever store produced the tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagAssembler {
  pub envelope: bool,
}

impl TagAssembler {
  pub fn new(envelope: bool) -> Self {
    Self {
      envelope,
    }
  }

  pub fn to_collection_response(&self, tags: Vec<Tag>) -> TagListResponse {
    let tags = tags.into_iter().map(TagName::from).collect();
    if self.envelope {
      TagListResponse::Envelope { tags }
    } else {
      TagListResponse::List(tags)
    }
  }
}
