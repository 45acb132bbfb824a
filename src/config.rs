// ABOUTME: Constants for the startup scope and CLI, mirroring the reference
// ABOUTME: implementation's root-scope bootstrap (veclisp_main) defaults.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_PROMPT: &str = "> ";
pub const DEFAULT_RESPONSE: &str = "; ";
pub const ERROR_PREFIX: &str = "! ";
pub const HISTORY_FILE_NAME: &str = ".veclisp_history";

pub const WELCOME_MESSAGE: &str = "veclisp -- a small lisp of integers, symbols, pairs, and vectors";
