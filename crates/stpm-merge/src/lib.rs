//! Reversible JSON merging.
//!
//! Packages contribute fragments to two kinds of shared JSON documents:
//!
//! - **objects** (translation tables), deep-merged key by key and reversed by
//!   deleting the exact leaf key paths the fragment contributed
//! - **named-block arrays** (the settings schema), merged record by record
//!   keyed on `name` (falling back to `type`) and reversed by removing the
//!   blocks matching a recorded [`BlockDescriptor`]
//!
//! All functions are pure; the caller loads and stores the documents.

pub mod blocks;
pub mod error;
pub mod key_path;
pub mod object;

pub use blocks::{
    AmbiguousMatch, BlockDescriptor, BlockKey, BlockRemoval, MatchMode, merge_named_blocks,
    remove_named_blocks,
};
pub use error::{Error, Result};
pub use key_path::{delete_key_path, get_key_path, leaf_key_paths};
pub use object::{as_array_mut, as_object_mut, deep_merge_objects};
