//! AtTask resources: Task, Project, User and Issue.
//!
//! Every kind shares one protocol. A static [`ResourceDescriptor`] names the
//! endpoint, the `objCode` and the recognized fields; [`Resources`] runs
//! `search` and `get` through a session and maps payloads into
//! [`ResourceObject`]s.

pub mod descriptor;
pub mod object;
pub mod ops;
pub mod transaction;

pub use descriptor::{ResourceDescriptor, ISSUE, PROJECT, TASK, USER};
pub use object::ResourceObject;
pub use ops::Resources;
pub use transaction::{rest_transaction, RestMethod};
