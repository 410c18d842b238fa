mod commands;
mod handlers;

pub use commands::{Cli, Commands, GlobalArgs};
pub use handlers::{
    handle_add, handle_clear, handle_count, handle_delete, handle_export, handle_get,
    handle_import, handle_init, handle_list, handle_serve, handle_update,
};
