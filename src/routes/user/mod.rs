mod handler;
mod model;

pub use handler::{login, logout, modify_password, profile, register, save_profile};
pub use model::{LoginResponse, UserProfile};
