pub mod script_locks;

pub use script_locks::ScriptLocks;
