use clap::{Parser, Subcommand, ValueEnum};
use service_proxy::Method;

#[derive(Parser)]
#[command(name = "gateway")]
#[command(
    author,
    version,
    about = "Query and health-check the backend services behind the API gateway"
)]
pub struct Cli {
    /// Gateway TOML configuration; services are read from the environment when omitted
    #[clap(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the health endpoint of every configured service
    Health {
        /// Print the health report as JSON instead of a table
        #[clap(long, default_value_t = false)]
        json: bool,
    },

    /// Send one request through a service proxy and print the response envelope
    Call {
        /// Name of the configured service
        service: String,

        /// Request path relative to the service base address
        path: String,

        /// HTTP method to use
        #[clap(short = 'X', long, value_enum, default_value_t = HttpMethod::Get)]
        method: HttpMethod,

        /// Query parameter as name=value (repeatable)
        #[clap(short, long = "query")]
        query: Vec<String>,

        /// JSON request body
        #[clap(short, long)]
        body: Option<String>,

        /// Per-attempt timeout override in milliseconds
        #[clap(long)]
        timeout_ms: Option<u64>,

        /// Retry budget override
        #[clap(long)]
        retries: Option<u32>,
    },

    /// Fetch several resources in parallel and print them keyed by name
    Aggregate {
        /// Legs as key=service:/path
        #[clap(required = true)]
        legs: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_arguments() {
        let cli = Cli::parse_from([
            "gateway", "--config", "gateway.toml", "call", "users", "/users/1", "-X", "patch", "-q",
            "expand=orders", "--retries", "0",
        ]);

        assert_eq!(cli.config.as_deref(), Some("gateway.toml"));
        match cli.command {
            Commands::Call {
                service,
                path,
                method,
                query,
                retries,
                ..
            } => {
                assert_eq!(service, "users");
                assert_eq!(path, "/users/1");
                assert_eq!(method, HttpMethod::Patch);
                assert_eq!(query, vec!["expand=orders"]);
                assert_eq!(retries, Some(0));
            }
            _ => panic!("expected call command"),
        }
    }

    #[test]
    fn test_aggregate_requires_legs() {
        assert!(Cli::try_parse_from(["gateway", "aggregate"]).is_err());
    }
}
