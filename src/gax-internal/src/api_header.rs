// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Telemetry header helpers.

/// The header identifying the client library and transport.
pub const API_CLIENT_HEADER: &str = "x-cloud-sdk-api-client";

/// Identifies the non-blocking transport.
pub const ASYNC_TRANSPORT: &str = "reqwest";
/// Identifies the blocking transport.
pub const BLOCKING_TRANSPORT: &str = "reqwest-blocking";

mod build_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/build_env.rs"));

    pub(crate) const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Format the value for the [API_CLIENT_HEADER].
pub fn header_value(transport: &str) -> String {
    let rustc_version = build_info::RUSTC_VERSION;
    let gax_version = build_info::PKG_VERSION;

    format!("gl-rust/{rustc_version} gax/{gax_version} rest/{gax_version}-{transport}")
}
