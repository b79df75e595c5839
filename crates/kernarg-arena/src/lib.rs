//! Fixed-layout scratch space and per-kernel workspaces for Kernarg.
//!
//! Everything a dispatcher touches lives here, allocated once when a
//! marshaling context is built and reused for every call afterwards.
//! This crate is one of two that may contain `unsafe` code (along with
//! `kernarg-ffi`), confined to [`raw`].
//!
//! # Architecture
//!
//! ```text
//! Layout (offsets computed once from ProblemDims)
//! ├── ScratchBuffer: Vec<f64> = [ u | xi | p ]
//! │   ├── pack_full(u, xi, p)   → all three segments
//! │   └── pack_reduced(u, p)    → u and p, xi untouched
//! └── Workspace × 4 (one per kernel)
//!     ├── iw: Vec<i64>          (sz_iw, may be empty)
//!     ├── w:  Vec<f64>          (sz_w,  may be empty)
//!     ├── ArgTable              (sz_arg slots, filled per native call)
//!     └── ResultTable           (sz_res slots, slot 0 bound per call)
//! ```
//!
//! ```text
//! 0        nu-1   nu       nu+nxi-1   nu+nxi        nu+nxi+np-1
//! |--- u ----|     |--- xi ----|       |------ p -------|
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod layout;
pub mod raw;
pub mod scratch;
pub mod workspace;

pub use error::LayoutError;
pub use layout::{Layout, SubRange};
pub use raw::{ArgTable, ResultTable};
pub use scratch::ScratchBuffer;
pub use workspace::Workspace;
