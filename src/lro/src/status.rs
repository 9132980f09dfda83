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

//! Classify the status of a long-running operation.
//!
//! Services report the operation status as a string token. The comparison is
//! case-insensitive, and unrecognized tokens are preserved. Only three tokens
//! are terminal:
//!
//! | Token       | finished | failed | succeeded |
//! |-------------|----------|--------|-----------|
//! | `Succeeded` | yes      | no     | yes       |
//! | `Failed`    | yes      | yes    | no        |
//! | `Canceled`  | yes      | yes    | no        |
//!
//! Any other token, including `InProgress`, is not finished.

const IN_PROGRESS: &str = "InProgress";
const SUCCEEDED: &str = "Succeeded";
const FAILED: &str = "Failed";
const CANCELED: &str = "Canceled";

/// The status of a long-running operation.
///
/// # Example
/// ```
/// # use cloud_sdk_lro::status::OperationStatus;
/// let status = OperationStatus::classify("SUCCEEDED");
/// assert_eq!(status, OperationStatus::Succeeded);
/// assert!(status.is_finished());
///
/// let status = OperationStatus::classify("Running");
/// assert_eq!(status, OperationStatus::Other("Running".to_string()));
/// assert!(!status.is_finished());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperationStatus {
    /// The operation has started and is not finished.
    InProgress,
    /// The operation completed successfully.
    Succeeded,
    /// The operation failed.
    Failed,
    /// The operation was canceled before it completed.
    Canceled,
    /// A service-specific, non-terminal, status.
    Other(String),
}

/// Normalize a status token before any comparison.
pub fn normalize<S: AsRef<str>>(raw: S) -> String {
    raw.as_ref().to_lowercase()
}

impl OperationStatus {
    /// Classify a raw status token.
    pub fn classify<S: AsRef<str>>(raw: S) -> Self {
        match normalize(&raw).as_str() {
            "inprogress" => Self::InProgress,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            _ => Self::Other(raw.as_ref().to_string()),
        }
    }

    /// The status token, using the canonical spelling for known values.
    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => IN_PROGRESS,
            Self::Succeeded => SUCCEEDED,
            Self::Failed => FAILED,
            Self::Canceled => CANCELED,
            Self::Other(s) => s.as_str(),
        }
    }

    /// Returns true if the operation reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.is_succeeded() || self.is_failed()
    }

    /// Returns true if the operation failed or was canceled.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed | Self::Canceled)
    }

    /// Returns true if the operation completed successfully.
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OperationStatus {
    fn from(value: &str) -> Self {
        Self::classify(value)
    }
}

impl From<String> for OperationStatus {
    fn from(value: String) -> Self {
        Self::classify(value)
    }
}

/// Returns true if `raw` is a terminal status token.
pub fn is_finished<S: AsRef<str>>(raw: S) -> bool {
    OperationStatus::classify(raw).is_finished()
}

/// Returns true if `raw` is a failed or canceled status token.
pub fn is_failed<S: AsRef<str>>(raw: S) -> bool {
    OperationStatus::classify(raw).is_failed()
}

/// Returns true if `raw` is a successful status token.
pub fn is_succeeded<S: AsRef<str>>(raw: S) -> bool {
    OperationStatus::classify(raw).is_succeeded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("succeeded", OperationStatus::Succeeded; "succeeded lower")]
    #[test_case("Succeeded", OperationStatus::Succeeded; "succeeded canonical")]
    #[test_case("SUCCEEDED", OperationStatus::Succeeded; "succeeded upper")]
    #[test_case("failed", OperationStatus::Failed; "failed lower")]
    #[test_case("FAILED", OperationStatus::Failed; "failed upper")]
    #[test_case("canceled", OperationStatus::Canceled; "canceled lower")]
    #[test_case("Canceled", OperationStatus::Canceled; "canceled canonical")]
    #[test_case("InProgress", OperationStatus::InProgress; "in progress canonical")]
    #[test_case("inprogress", OperationStatus::InProgress; "in progress lower")]
    #[test_case("Running", OperationStatus::Other("Running".to_string()); "passthrough")]
    #[test_case("", OperationStatus::Other(String::new()); "empty")]
    fn classify(raw: &str, want: OperationStatus) {
        assert_eq!(OperationStatus::classify(raw), want);
        assert_eq!(OperationStatus::from(raw), want);
        assert_eq!(OperationStatus::from(raw.to_string()), want);
    }

    #[test_case("succeeded", true, false, true; "succeeded lower")]
    #[test_case("Succeeded", true, false, true; "succeeded canonical")]
    #[test_case("SUCCEEDED", true, false, true; "succeeded upper")]
    #[test_case("failed", true, true, false; "failed lower")]
    #[test_case("Failed", true, true, false; "failed canonical")]
    #[test_case("canceled", true, true, false; "canceled lower")]
    #[test_case("CANCELED", true, true, false; "canceled upper")]
    #[test_case("InProgress", false, false, false; "in progress")]
    #[test_case("Running", false, false, false; "passthrough")]
    #[test_case("cancelled", false, false, false; "british spelling")]
    fn predicates(raw: &str, finished: bool, failed: bool, succeeded: bool) {
        assert_eq!(is_finished(raw), finished, "{raw}");
        assert_eq!(is_failed(raw), failed, "{raw}");
        assert_eq!(is_succeeded(raw), succeeded, "{raw}");
        let status = OperationStatus::classify(raw);
        assert_eq!(status.is_finished(), finished, "{status:?}");
        assert_eq!(status.is_failed(), failed, "{status:?}");
        assert_eq!(status.is_succeeded(), succeeded, "{status:?}");
    }

    #[test_case(OperationStatus::InProgress, "InProgress")]
    #[test_case(OperationStatus::Succeeded, "Succeeded")]
    #[test_case(OperationStatus::Failed, "Failed")]
    #[test_case(OperationStatus::Canceled, "Canceled")]
    #[test_case(OperationStatus::Other("NotStarted".to_string()), "NotStarted")]
    fn display(status: OperationStatus, want: &str) {
        assert_eq!(status.to_string(), want);
        assert_eq!(status.as_str(), want);
    }

    #[test]
    fn normalize_lowercase() {
        assert_eq!(normalize("InProgress"), "inprogress");
        assert_eq!(normalize("SUCCEEDED"), "succeeded");
    }
}
