#[derive(Debug)]
pub struct Version {
    pub build_profile: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

impl Version {
    pub fn new() -> Self {
        Self {
            build_profile: if cfg!(debug_assertions) { "debug" } else { "release" },
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new()
    }
}
