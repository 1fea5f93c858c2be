//! Output generation for archived job results.
//!
//! # Output Structure
//!
//! ```text
//! archive_dir/
//! ├── 0b7e4c1e-....json
//! └── 5f1d2a90-....json
//! ```

pub mod json;
