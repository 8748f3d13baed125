use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Management CLI for the path proxy admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, default_value = "admin-secret-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy system status
    Status,
    /// List routes with their hosts
    Routes,
    /// Register or replace a route
    SetRoute {
        /// Input pattern, e.g. /svc/:id
        input: String,
        /// Output pattern, e.g. /v2/:id
        output: String,
        /// round_robin, random or least_connections
        #[arg(short, long, default_value = "round_robin")]
        balancer: String,
    },
    /// Remove a route by key or pattern
    RemoveRoute { key: String },
    /// Append a host to a route's pool
    AddHost { route: String, address: String },
    /// Allow a host to be selected again
    EnableHost { route: String, address: String },
    /// Stop selecting a host
    DisableHost { route: String, address: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let routes_url = format!("{}/admin/routes", cli.url);
    let hosts_url = format!("{}/admin/hosts", cli.url);

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Routes => client.get(&routes_url),
        Commands::SetRoute { input, output, balancer } => client
            .post(&routes_url)
            .json(&json!({ "input": input, "output": output, "balancer": balancer })),
        Commands::RemoveRoute { key } => client.delete(&routes_url).json(&json!({ "key": key })),
        Commands::AddHost { route, address } => client
            .post(&hosts_url)
            .json(&json!({ "route": route, "address": address })),
        Commands::EnableHost { route, address } => client
            .put(&hosts_url)
            .json(&json!({ "route": route, "address": address, "enabled": true })),
        Commands::DisableHost { route, address } => client
            .put(&hosts_url)
            .json(&json!({ "route": route, "address": address, "enabled": false })),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if text.is_empty() {
        println!("OK ({})", status);
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
