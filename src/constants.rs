//! Shared constants used across the application.

/// User agent sent with every backend request.
pub const USER_AGENT: &str = concat!("catalog-site/", env!("CARGO_PKG_VERSION"));

/// Login entry point for the admin area.
pub const LOGIN_ROUTE: &str = "/AdminLogin";

/// Dashboard for privileged roles.
pub const PRIVILEGED_DASHBOARD_ROUTE: &str = "/superadmin/dashboard";

/// Dashboard for every other role.
pub const STANDARD_DASHBOARD_ROUTE: &str = "/dashboard";

/// Where the "Login to Blogs" button sends non-privileged users.
pub const DEFAULT_BLOGS_LOGIN_TARGET: &str = "https://blog.connectingdotserp.com/";

/// Maximum number of related articles shown under a post.
pub const RELATED_LIMIT: usize = 3;

/// Characters of plain text kept in a card excerpt.
pub const EXCERPT_CHARS: usize = 80;

/// Storage keys for the persisted admin session.
pub mod storage_keys {
    pub const TOKEN: &str = "adminToken";
    pub const ROLE: &str = "adminRole";
    pub const USERNAME: &str = "adminUsername";
    pub const ID: &str = "adminId";
    pub const LOGGED_IN: &str = "isAdminLoggedIn";

    /// Every key, in the order they are written.
    pub const ALL: [&str; 5] = [TOKEN, ROLE, USERNAME, ID, LOGGED_IN];
}
