#[derive(Clone)]
pub struct AppConfig {
    pub admin_url: String,
    pub admin_token: Option<String>,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub places_base_url: String,
    pub places_v1_base_url: String,
    pub photo_max_width: u32,
    pub fetch_opening_hours: bool,
    pub field_name: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("admin_url", &self.admin_url)
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("places_base_url", &self.places_base_url)
            .field("places_v1_base_url", &self.places_v1_base_url)
            .field("photo_max_width", &self.photo_max_width)
            .field("fetch_opening_hours", &self.fetch_opening_hours)
            .field("field_name", &self.field_name)
            .finish()
    }
}
