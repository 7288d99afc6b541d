mod handler;
mod model;

pub use handler::{add_sub_user, del_sub_user, sub_user_list};
