//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Vertex extraction with surveyed accuracy

mod extractor;
mod metadata;
mod vertex;

pub use self::extractor::{ExtractError, VertexExtractor};
pub use self::metadata::{ConfidencePoint, MetadataError};
pub use self::vertex::{ExtractionResult, VertexRecord};

#[cfg(test)]
mod extractor_test;
