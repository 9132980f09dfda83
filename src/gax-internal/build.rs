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

//! Records the compiler version for the telemetry headers.

use std::io::Write;
use std::path::PathBuf;

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    let out_dir = std::env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| std::io::Error::other("OUT_DIR not specified"))?;
    let version = rustc_version::version().map_err(std::io::Error::other)?;

    let mut f = std::fs::File::create(out_dir.join("build_env.rs"))?;
    writeln!(
        f,
        "pub(crate) const RUSTC_VERSION: &str = \"{}.{}.{}\";",
        version.major, version.minor, version.patch
    )?;
    f.flush()
}
