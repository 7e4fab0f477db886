//! Centralized limits for tree traversal.
//!
//! Resolved trees come from an external analyzer and may be arbitrarily
//! deep. Recursive passes check these bounds and report the offending node as
//! unsupported instead of overflowing the stack.

/// Maximum recursion depth for any tree walk (rewrite passes and emission).
pub const MAX_TREE_DEPTH: u32 = 1_000;

/// Maximum length of a member-access chain followed by the value-type
/// expander and the switch discriminant analysis (`a.b.c.d...`).
pub const MAX_MEMBER_CHAIN_DEPTH: u32 = 100;

/// Maximum number of characters of a node's textual form kept in an
/// unsupported-construct diagnostic.
pub const MAX_DESCRIPTION_LEN: usize = 80;
