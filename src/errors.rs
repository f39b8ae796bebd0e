// Copyright 2016-2018 Matthew D. Michelotti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use failure::{Backtrace, Context, Fail};
use std::fmt;
use std::result::Result as StdResult;

/// The ways in which building a `Level` can fail.
///
/// Physics never fails; everything here is a load-time error.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "Unable to load {}", _0)]
    Unreadable(String),

    #[fail(display = "Expected {} but found {} at line {}", expected, found, line)]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        line: usize,
    },

    #[fail(display = "Expected {} but reached end of file at line {}", expected, line)]
    UnexpectedEof { expected: &'static str, line: usize },

    #[fail(display = "Could not load {} {} at line {}", role, name, line)]
    MissingBitmap {
        role: &'static str,
        name: String,
        line: usize,
    },

    #[fail(display = "Unable to obtain {} sprite", _0)]
    MissingSprite(&'static str),

    #[fail(display = "Friction must be positive at line {}", _0)]
    BadFriction(usize),

    #[fail(display = "Unknown vertex referenced at line {}", _0)]
    UnknownVertex(usize),

    #[fail(display = "Unknown material referenced at line {}", _0)]
    UnknownMaterial(usize),

    #[fail(display = "Unknown object referenced at line {}", _0)]
    UnknownObjectType(usize),

    #[fail(display = "Edge fixing did not settle after {} iterations", iterations)]
    DegenerateGeometry { iterations: usize },

    #[fail(display = "Bad level config: {}", _0)]
    BadConfig(String),
}

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Level load - {}", self.inner.get_context())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::from(Context::new(kind))
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Self {
        Error { inner }
    }
}

pub type Result<T> = StdResult<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use failure::ResultExt;
    use std::io;

    #[test]
    fn test_display_prefix() {
        let error = Error::from(ErrorKind::UnknownVertex(12));
        assert_eq!(error.to_string(), "Level load - Unknown vertex referenced at line 12");
        assert_eq!(error.kind(), &ErrorKind::UnknownVertex(12));
    }

    #[test]
    fn test_io_cause_is_kept() {
        let result: StdResult<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let error: Error = result.context(ErrorKind::Unreadable("level.txt".to_owned())).unwrap_err().into();
        assert_eq!(error.to_string(), "Level load - Unable to load level.txt");
        assert!(error.cause().is_some());
    }
}
