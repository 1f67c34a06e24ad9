// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for building generation
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a single building cannot be generated
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid roof: {0}")]
    InvalidRoof(String),

    #[error("Invalid windows parameters: {0}")]
    InvalidWindows(String),

    #[error(transparent)]
    Geometry(#[from] skyline_geometry::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
