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

//! Entry point to the service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use std::net::Ipv4Addr;
use std::process;

use trailhead::env::get_optional_var;

#[tokio::main]
async fn main() {
    env_logger::init();

    let port = match get_optional_var::<u16>("TRAILHEAD", "PORT") {
        Ok(port) => port.unwrap_or(3000),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = trailhead::serve((Ipv4Addr::UNSPECIFIED, port)).await {
        eprintln!("{}", e);
        process::exit(1);
    }
}
