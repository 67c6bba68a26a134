//! Static page bodies, compiled into the binary.

pub const INDEX: &str = include_str!("../../templates/index.html");
pub const TEST: &str = include_str!("../../templates/test.html");
pub const NOT_FOUND: &str = include_str!("../../templates/404.html");
