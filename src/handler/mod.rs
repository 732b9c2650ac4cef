mod delivery;
mod keyboard;
mod message;

pub use delivery::deliver;

use message::{handle_inbound, to_inbound};
use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    types::Update,
};

pub fn get_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message()
        .filter_map(to_inbound)
        .endpoint(handle_inbound)
}
