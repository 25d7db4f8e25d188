mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod user;

pub(crate) use cookie::{invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_api};
pub use password::PasswordHash;
pub(crate) use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub use register_user::{get_register_page, register_user};
pub use user::{User, UserID, create_user, create_user_table, get_user_by_id, get_user_by_username};

#[cfg(test)]
pub(crate) use cookie::COOKIE_USER_ID;
