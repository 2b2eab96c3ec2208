/// How the subscriber formats output; built from the `logging` settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, json_format: bool) -> Self {
        Self {
            environment: environment.into(),
            json_format,
            default_filter: String::from("info,snowmow=debug,tower_http=debug,sqlx=warn"),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new("development", false)
    }
}
