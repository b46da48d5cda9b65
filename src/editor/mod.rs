pub mod history;
pub mod layout;
pub mod session;
pub mod store;

pub use layout::grid_layout;
pub use session::EditorSession;
