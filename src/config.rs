// ABOUTME: Version and welcome-banner constants for the CLI shell

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "lispkit 0.1.0";
pub const WELCOME_SUBTITLE: &str = "an embeddable Lisp core: reader, evaluator, mark-and-sweep collector";
