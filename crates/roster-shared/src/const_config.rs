//! Stores settings that are not expected to need to change but grouped together
//! for discoverability and reuse. Each constant should be prefixed by the module
//! name to allow importing the constant only and still be readable

pub const PANIC_ON_RARE_ERR: bool = true;

pub mod client {
    /// The one key of persisted client state. Holds the scheme-prefixed bearer
    /// token; absence of the key means the viewer is anonymous.
    pub const TOKEN_STORAGE_KEY: &str = "Authorization";

    // TODO 3: Load url from the deployment config into the binary at compile time
    pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:4000";
}

pub mod path {
    mod path_spec;
    pub use path_spec::PathSpec;
    pub const PATH_ADMIN_USERS: PathSpec = PathSpec::get("/admin/users");
    /// Suffix with the target user id
    pub const PATH_ADMIN_USER_UPDATE: PathSpec = PathSpec::patch("/admin/users/");
    pub const PATH_LOGIN: PathSpec = PathSpec::post("/login");
    pub const PATH_ROLE: PathSpec = PathSpec::get("/role");
    pub const PATH_SIGNUP: PathSpec = PathSpec::post("/signup");
    /// Suffix with the target user id
    pub const PATH_USER_PROFILE: PathSpec = PathSpec::get("/users/");
    /// Suffix with the target user id
    pub const PATH_USER_PROFILE_UPDATE: PathSpec = PathSpec::patch("/users/");
    pub const PATH_VALIDATE: PathSpec = PathSpec::get("/validate");
}
