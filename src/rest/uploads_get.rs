// Trailhead
// Copyright 2025 The Trailhead Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! API to serve uploaded images from the uploads directory.
//!
//! Only a fixed set of image extensions is served.  Anything else, including
//! path traversal attempts, is reported as not found rather than rejected
//! with a distinct error, so the handler reveals nothing about the
//! filesystem behind it.

use crate::rest::{RestError, RestResult};
use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Maps the allowed image extensions (lowercase) to their Content-Type.
const IMAGE_TYPES: [(&str, &str); 6] = [
    ("gif", "image/gif"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
];

/// Returns the Content-Type to serve `path` with, or `None` if the file type is not served.
fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    IMAGE_TYPES.iter().find(|(ext, _)| *ext == extension).map(|(_, mime)| *mime)
}

/// Checks that `path` stays within the uploads directory when joined to it.
fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|component| matches!(component, Component::Normal(_)))
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(uploads_dir): State<Arc<PathBuf>>,
    UrlPath(path): UrlPath<String>,
) -> RestResult<Response> {
    let path = PathBuf::from(path);
    if !is_plain_relative(&path) {
        return Err(RestError::NotFound("File not found".to_owned()));
    }
    let content_type = match content_type_for(&path) {
        Some(content_type) => content_type,
        None => return Err(RestError::NotFound("File not found".to_owned())),
    };

    match tokio::fs::read(uploads_dir.join(path)).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RestError::NotFound("File not found".to_owned()))
        }
        Err(e) => Err(RestError::InternalError(format!("Cannot read upload: {}", e))),
    }
}
