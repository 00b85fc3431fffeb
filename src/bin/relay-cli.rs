use clap::Parser;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send one generation request through a running relay", long_about = None)]
struct Cli {
    /// Relay endpoint.
    #[arg(short, long, default_value = "http://localhost:8080/generate")]
    url: String,

    /// Prompt text forwarded as `input`.
    #[arg(short, long)]
    input: String,

    /// Generation mode (the relay defaults it to "default").
    #[arg(short, long)]
    mode: Option<String>,

    /// Comma-separated tags.
    #[arg(short, long)]
    tags: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut body = json!({ "input": cli.input });
    if let Some(mode) = cli.mode {
        body["mode"] = Value::String(mode);
    }
    if let Some(tags) = cli.tags {
        body["tags"] = Value::String(tags);
    }

    let res = client.post(&cli.url).json(&body).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        eprintln!("Response: {}", rendered);
        std::process::exit(1);
    }

    println!("{}", rendered);
    Ok(())
}
