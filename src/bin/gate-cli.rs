use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, SET_COOKIE};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Management CLI for the portfolio gate", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin session token, sent as a bearer token.
    #[arg(short, long, env = "GATE_ADMIN_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the session token
    Login {
        #[arg(short, long, env = "ADMIN_PASSWORD")]
        password: String,
    },
    /// Check whether the token is a valid admin session
    Verify,
    /// Show gate status (requires a token)
    Status,
    /// Clear API rate limits (development only)
    ClearRateLimit,
    /// Clear the session cookies
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    match cli.command {
        Commands::Login { password } => {
            let res = client
                .post(format!("{}/api/admin/login", base))
                .json(&serde_json::json!({ "password": password }))
                .send()
                .await?;
            let token = res
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .find_map(session_token);
            print_response(res).await?;
            if let Some(token) = token {
                println!("token: {}", token);
            }
        }
        Commands::Verify => {
            let res = client
                .get(format!("{}/api/admin/check-auth", base))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let res = client
                .get(format!("{}/api/admin/status", base))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::ClearRateLimit => {
            let res = client
                .post(format!("{}/api/admin/clear-rate-limit", base))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Logout => {
            let res = client
                .post(format!("{}/api/admin/logout", base))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Token from an `admin_token=<value>; ...` cookie.
fn session_token(set_cookie: &str) -> Option<String> {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("admin_token="))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gate returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
