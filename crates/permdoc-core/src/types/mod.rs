mod access;
mod file_state;
mod finding;
mod identity;
mod link;
mod mode;
mod platform;
mod report;
mod request;
mod search_path;

pub use access::*;
pub use file_state::*;
pub use finding::*;
pub use identity::*;
pub use link::*;
pub use mode::*;
pub use platform::*;
pub use report::*;
pub use request::*;
pub use search_path::*;
