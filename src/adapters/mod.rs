// Adapters layer: concrete implementations for external systems (local files, processes, WebHDFS).

pub mod process;
pub mod storage;
pub mod webhdfs;

pub use process::SystemCommandRunner;
pub use storage::LocalStorage;
pub use webhdfs::WebHdfsClient;
