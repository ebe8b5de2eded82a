pub mod cli;
pub mod config;
pub mod models;
pub mod store;
pub mod sync;
pub mod utils;

pub use config::Config;
pub use models::{Activity, ActivityPage, Board, List, NewTask, Priority, Task, TaskPatch, User};
pub use store::{BoardStore, StoreError};
pub use sync::{ChangeKind, SyncChannel};
pub use utils::Profile;
