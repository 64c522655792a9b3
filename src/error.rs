// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("element {0} is not in the disjoint set")]
    UnknownElement(String),
    #[error("index {index} is out of bounds for {len} elements")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("exceeded probe limit of {limit} slots in a table of capacity {capacity}")]
    ProbeLimitExceeded { capacity: usize, limit: usize },
    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
