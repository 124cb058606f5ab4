/*
 * SPDX-License-Identifier: MIT
 * Copyright (c) "2026" . The Fracture Network Simulator Authors. All Rights Reserved.
 */
use std::error::Error;
use std::fmt;
use std::io;

/// Failures writing the two contractual export formats (ASCII and FAB).
/// Wraps the underlying `std::io::Error` since both writers target an
/// arbitrary `impl std::io::Write` sink, never a concrete file handle.
#[derive(Debug)]
pub enum IoError {
    Write(io::Error),
    EmptyFractureSet,
}

impl Error for IoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            IoError::Write(e) => Some(e),
            IoError::EmptyFractureSet => None,
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Write(e) => write!(f, "write failed: {e}"),
            IoError::EmptyFractureSet => write!(f, "FAB export requires at least one fracture set"),
        }
    }
}

impl From<io::Error> for IoError {
    fn from(err: io::Error) -> Self {
        IoError::Write(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::Other, "disk full");
        let err: IoError = io_err.into();
        assert!(err.to_string().contains("disk full"));
    }
}
