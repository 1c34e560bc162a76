//! Centralized regex engine limits and configuration constants.
//!
//! Every number that shapes what the compiler accepts or how far the
//! matcher is allowed to go lives here, so the engine can be tuned in
//! one place.

// ===== Program =====

/// Validity marker stored in byte 0 of a serialized program and checked
/// before every execute/substitute call.
pub const MAGIC: u8 = 0o234;

/// Size of the serialized program header: magic, group count, counter count.
pub const PROGRAM_HEADER_SIZE: usize = 3;

/// Largest node count a program may have. Node links are 16-bit deltas,
/// so this keeps every forward or backward jump addressable.
pub const MAX_PROGRAM_NODES: usize = 32767;

// ===== Compiler =====

/// Default ceiling on capturing groups per pattern.
/// Can be overridden per compile through `CompileFlags::max_groups`.
pub const MAX_CAPTURE_GROUPS: usize = 50;

/// Hard ceiling for `CompileFlags::max_groups`; group numbers are stored
/// in a single byte.
pub const MAX_GROUP_NUMBER: usize = 255;

/// Maximum number of general `{m,n}` constructs per pattern.
pub const MAX_COUNTERS: usize = 255;

/// Largest `m` or `n` accepted in `{m,n}`.
pub const MAX_BOUND_VALUE: u32 = 65535;

/// Largest statically known look-behind body length.
pub const MAX_LOOK_BEHIND: i64 = 65535;

/// Only `\1` through `\9` are back references.
pub const MAX_BACK_REFERENCE: u8 = 9;

/// Characters that end a run of ordinary characters in a pattern.
/// The leading `{` is dropped when counting quantifiers are disabled.
pub const META_CHARS: &[u8] = b"{.*+?[(|)^<>$";

// ===== Matcher =====

/// Default ceiling on matcher recursion depth. Exceeding it aborts the
/// whole search, not just the current start position.
/// Sized so the deepest search stays well inside a 2 MiB thread stack;
/// unoptimized builds use much larger frames per level.
pub const DEFAULT_RECURSION_LIMIT: usize = if cfg!(debug_assertions) { 300 } else { 1_500 };

/// Native stack bytes to budget per level of matcher recursion, for
/// callers that run searches on a thread of their own.
pub const RECURSION_STACK_BYTES: usize = if cfg!(debug_assertions) { 4096 } else { 1024 };

// ===== Delimiters =====

/// Word delimiters used when the host never configured its own.
pub const DEFAULT_WORD_DELIMITERS: &[u8] = b".,/\\`'!|@#%^&*()-=+{}[]\":;<>?";
