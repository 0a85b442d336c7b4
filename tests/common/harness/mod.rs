//! Test harness for CLI integration tests.
//!
//! Provides isolated project directories, a document builder,
//! and CLI assertion helpers using `assert_cmd`.

mod command;
mod doc;
mod env;

#[allow(unused_imports)]
pub use command::MdvetCommand;
#[allow(unused_imports)]
pub use doc::TestDoc;
#[allow(unused_imports)]
pub use env::TestEnv;
