//! Recursive Length Prefix encoding for the records persisted by the hook.
//!
//! See <https://ethereum.org/en/developers/docs/data-structures-and-encoding/rlp/>.

pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod structs;
