mod camera;
mod drag;
mod focus;
mod inner_area;
mod input;
mod insert;
mod plugin;
mod requests;
mod settings;
mod shortcuts;
mod state;

pub use camera::*;
pub use drag::*;
pub use focus::*;
pub use inner_area::*;
pub use input::*;
pub use insert::*;
pub use plugin::*;
pub use requests::*;
pub use settings::*;
pub use shortcuts::*;
pub use state::*;
