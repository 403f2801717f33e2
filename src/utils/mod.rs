pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{has_web_scheme, normalize_url};
