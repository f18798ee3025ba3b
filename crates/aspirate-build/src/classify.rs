//! Build tool failure classification

use std::fmt;

/// `dotnet publish` refused duplicate files in the publish output
pub const DUPLICATE_OUTPUT_FILES_MARKER: &str = "NETSDK1152";

/// The registry rejected the push (not logged in)
pub const NO_REGISTRY_ACCESS_MARKER: &str = "CONTAINER1016";

/// The registry address could not be resolved or reached
pub const UNKNOWN_REGISTRY_ADDRESS_MARKER: &str = "CONTAINER1013";

/// Why a build attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    DuplicateOutputFiles,
    NoRegistryAccess,
    UnknownRegistryAddress,
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DuplicateOutputFiles => "duplicate output files",
            Self::NoRegistryAccess => "no registry access",
            Self::UnknownRegistryAddress => "unknown registry address",
            Self::Unknown => "unknown failure",
        };
        f.write_str(s)
    }
}

/// Classify diagnostic text, checking markers in priority order
pub fn classify(diagnostics: &str) -> FailureKind {
    let text = diagnostics.to_ascii_uppercase();
    if text.contains(DUPLICATE_OUTPUT_FILES_MARKER) {
        FailureKind::DuplicateOutputFiles
    } else if text.contains(NO_REGISTRY_ACCESS_MARKER) {
        FailureKind::NoRegistryAccess
    } else if text.contains(UNKNOWN_REGISTRY_ADDRESS_MARKER) {
        FailureKind::UnknownRegistryAddress
    } else {
        FailureKind::Unknown
    }
}
