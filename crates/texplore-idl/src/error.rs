//! Loader error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading a schema directory.
#[derive(Debug, Error)]
pub enum IdlError {
    /// Filesystem access failed.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The source text does not parse.
    #[error("{file}:{line}: {message}")]
    Parse {
        /// The file being parsed.
        file: String,
        /// 1-based line of the offending token.
        line: u32,
        /// What went wrong.
        message: String,
    },

    /// An `include` directive pointed at a file that does not exist.
    #[error("{file}: include '{include}' not found")]
    MissingInclude {
        /// The including file.
        file: String,
        /// The include path as written.
        include: String,
    },

    /// Includes form a cycle.
    #[error("{file}: include cycle through '{include}'")]
    IncludeCycle {
        /// The including file.
        file: String,
        /// The include path that closed the cycle.
        include: String,
    },

    /// A type reference matched no declaration in scope.
    #[error("{file}: unknown type '{name}'")]
    UnknownType {
        /// The file containing the reference.
        file: String,
        /// The unresolved name as written.
        name: String,
    },
}
