pub mod system_handlers;
pub mod wizard_handlers;

pub use system_handlers::*;
pub use wizard_handlers::*;
