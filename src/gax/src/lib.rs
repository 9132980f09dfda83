// Copyright 2024 Google LLC
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

//! Cloud SDK helpers.
//!
//! This crate contains a number of types and functions used in the
//! implementation of the Cloud SDK for Rust client libraries: the error type
//! returned by all clients, the raw HTTP request and response types, the
//! transport traits consumed by the long-running operation pollers, and the
//! per-request options.
//!
//! <div class="warning">
//! The transport traits are <b>not</b> intended for general use. They exist
//! so the generated clients and the long-running operation helpers can share
//! a transport. We (the Cloud SDK for Rust team) control both and will change
//! both if needed.
//! </div>

/// An alias of [std::result::Result] where the error is always [crate::error::Error].
///
/// This is the result type used by all functions wrapping RPCs.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// The core error types used by generated clients.
pub mod error;

/// Defines traits and helpers for HTTP client implementations.
pub mod http_client;

pub mod client_builder;
pub mod options;
pub mod response;
pub mod retry_after;
