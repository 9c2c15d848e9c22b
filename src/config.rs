use clap::{Args, Parser, ValueEnum};

/// Fallback signing secret used when none is configured. Never use it outside development.
pub const INSECURE_SESSION_SECRET: &str = "36YW<QhYc{iC9>6";

/// Upper bound on the session lifetime, roughly a century.
pub const MAX_SESSION_TTL_DAYS: i64 = 36_500;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Deployment environment; gates request-failure logging and the robots policy
    #[arg(long, env = "CORNERSTONE_ENV", value_enum, default_value_t = Environment::Development)]
    pub environment: Environment,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub session: SessionConfig,

    #[command(flatten)]
    pub guard: GuardConfig,

    #[command(flatten)]
    pub client: ClientConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "CORNERSTONE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "CORNERSTONE_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, env = "CORNERSTONE_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct SessionConfig {
    /// Symmetric secret used to sign session tokens (HS256)
    #[arg(
        long = "session-secret",
        env = "CORNERSTONE_SESSION_SECRET",
        default_value = INSECURE_SESSION_SECRET,
        hide_env_values = true,
        hide_default_value = true
    )]
    pub secret: String,

    /// Session cookie and token lifetime in days
    #[arg(
        long = "session-ttl-days",
        env = "CORNERSTONE_SESSION_TTL_DAYS",
        default_value_t = 30,
        value_parser = clap::value_parser!(i64).range(1..=MAX_SESSION_TTL_DAYS)
    )]
    pub ttl_days: i64,

    /// Name of the cookie carrying the session token
    #[arg(long = "session-cookie-name", env = "CORNERSTONE_SESSION_COOKIE", default_value = "session")]
    pub cookie_name: String,
}

impl SessionConfig {
    #[must_use]
    pub fn uses_insecure_secret(&self) -> bool {
        self.secret == INSECURE_SESSION_SECRET
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { secret: INSECURE_SESSION_SECRET.to_string(), ttl_days: 30, cookie_name: "session".to_string() }
    }
}

#[derive(Clone, Debug, Args)]
pub struct GuardConfig {
    /// Paths that require a valid session (exact match)
    #[arg(long, env = "CORNERSTONE_PROTECTED_ROUTES", default_value = "/", value_delimiter = ',')]
    pub protected_routes: Vec<String>,

    /// Paths only reachable without a session (exact match)
    #[arg(
        long,
        env = "CORNERSTONE_AUTH_ROUTES",
        default_value = "/signin,/signup,/forgot,/reset",
        value_delimiter = ','
    )]
    pub auth_routes: Vec<String>,

    /// Path prefixes the guard never evaluates (API routes, static assets, favicon)
    #[arg(
        long,
        env = "CORNERSTONE_GUARD_EXCLUDED_PREFIXES",
        default_value = "/api,/static,/favicon.ico",
        value_delimiter = ','
    )]
    pub excluded_prefixes: Vec<String>,

    /// Where unauthenticated visitors of protected routes are sent
    #[arg(long, env = "CORNERSTONE_SIGN_IN_PATH", default_value = "/signin")]
    pub sign_in_path: String,

    /// Where authenticated visitors of auth routes are sent
    #[arg(long, env = "CORNERSTONE_HOME_PATH", default_value = "/")]
    pub home_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_routes: vec!["/".to_string()],
            auth_routes: ["/signin", "/signup", "/forgot", "/reset"].map(String::from).to_vec(),
            excluded_prefixes: ["/api", "/static", "/favicon.ico"].map(String::from).to_vec(),
            sign_in_path: "/signin".to_string(),
            home_path: "/".to_string(),
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct ClientConfig {
    /// Base URL of the backend API; also used by the server to exchange sign-in credentials
    #[arg(long, env = "CORNERSTONE_API_BASE_URL", default_value = "")]
    pub api_base_url: String,

    /// Header sent on every request to skip a tunneling proxy's browser warning page
    #[arg(long, env = "CORNERSTONE_TUNNEL_BYPASS_HEADER", default_value = "ngrok-skip-browser-warning")]
    pub tunnel_bypass_header: String,

    /// Restrict sign-out storage clearing to keys with this prefix instead of wiping everything
    #[arg(long, env = "CORNERSTONE_STORAGE_NAMESPACE")]
    pub storage_namespace: Option<String>,

    /// Google OAuth client id (accepted for provider wiring, unused by the session core)
    #[arg(long, env = "CORNERSTONE_GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            tunnel_bypass_header: "ngrok-skip-browser-warning".to_string(),
            storage_namespace: None,
            google_client_id: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "CORNERSTONE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for traces and metrics; export is disabled when unset
    #[arg(long, env = "CORNERSTONE_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
