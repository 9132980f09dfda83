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

//! Errors returned by the client libraries.
//!
//! The Cloud SDK for Rust distinguishes between errors detected while trying
//! to send a request (e.g. cannot open a connection), errors trying to receive
//! a response (e.g. the connection is dropped before the full response), and
//! errors detected while driving a long-running operation to completion (e.g.
//! the service returned an unexpected status code while polling).
//!
//! # Examples
//!
//! ```
//! use cloud_sdk_gax::error::Error;
//! fn handle_error(e: Error) {
//!     if e.is_polling() {
//!         println!("the operation failed, last HTTP status was {:?}", e.http_status_code());
//!     }
//! }
//! ```

mod core_error;
pub use core_error::*;
