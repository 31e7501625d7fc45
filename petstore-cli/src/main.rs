use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use http::Method;
use petstore_client::transport::TransportResponse;
use petstore_client::{
    ApiClient, ApiConfig, Blob, CallSpec, DEFAULT_BASE_PATH, ReqwestTransport,
};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "petstore")]
#[command(about = "Sends a single request to the Petstore API", long_about = None)]
struct Args {
    /// Base URL every path is appended to
    #[arg(short = 'b', long, default_value = DEFAULT_BASE_PATH)]
    base_path: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Path template, e.g. /pet/{petId}
    path: String,

    /// Path parameter as name=value
    #[arg(short = 'p', long = "path-param", value_parser = parse_key_value)]
    path_params: Vec<(String, String)>,

    /// Query parameter as name=value
    #[arg(short = 'q', long = "query", value_parser = parse_key_value)]
    query_params: Vec<(String, String)>,

    /// Header as name=value
    #[arg(short = 'H', long = "header", value_parser = parse_key_value)]
    header_params: Vec<(String, String)>,

    /// Form field as name=value
    #[arg(short = 'f', long = "form", value_parser = parse_key_value)]
    form_params: Vec<(String, String)>,

    /// File form field as name=path
    #[arg(long = "file", value_parser = parse_key_value)]
    files: Vec<(String, String)>,

    /// Request body; sent as a JSON string if it does not parse as JSON
    #[arg(short = 'd', long)]
    data: Option<String>,

    /// Content type candidate, may be repeated
    #[arg(long = "content-type")]
    content_types: Vec<String>,

    /// Accept type candidate, may be repeated
    #[arg(long = "accept")]
    accepts: Vec<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn parse_key_value(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(anyhow!("empty name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_body(data: &str) -> Value {
    serde_json::from_str(data).unwrap_or_else(|_| Value::String(data.to_string()))
}

async fn read_blob(path: &str) -> Result<Blob> {
    let path = PathBuf::from(path);
    let bytes = tokio::fs::read(&path)
        .await
        .context(format!("Failed to read {:?}", path))?;
    let mut blob = Blob::new(bytes);
    if let Some(file_name) = path.file_name() {
        blob = blob.with_file_name(file_name.to_string_lossy());
    }
    Ok(blob)
}

async fn build_call(args: &Args) -> Result<CallSpec> {
    let method = Method::from_str(&args.method.to_uppercase())
        .context(format!("Invalid method {}", args.method))?;

    let mut call = CallSpec::new(method, args.path.as_str())
        .content_types(args.content_types.iter().cloned())
        .accepts(args.accepts.iter().cloned());
    for (name, value) in &args.path_params {
        call = call.path_param(name.as_str(), value.as_str());
    }
    for (name, value) in &args.query_params {
        call = call.query_param(name.as_str(), value.as_str());
    }
    for (name, value) in &args.header_params {
        call = call.header_param(name.as_str(), value.as_str());
    }
    for (name, value) in &args.form_params {
        call = call.form_param(name.as_str(), value.as_str());
    }
    for (name, path) in &args.files {
        call = call.form_param(name.as_str(), read_blob(path).await?);
    }
    if let Some(data) = &args.data {
        call = call.body(parse_body(data));
    }
    Ok(call)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .context("Failed to create HTTP client")?;
    let client = ApiClient::with_config(
        &ApiConfig::new_from_base_path(args.base_path.as_str()),
        ReqwestTransport::from_client(http_client),
    );

    let call = build_call(&args).await?;
    let in_flight = client.call_api(call);
    log::info!("{} {}", in_flight.method(), in_flight.url());

    match in_flight.execute().await {
        Ok(reply) => {
            println!("{}", reply.response().status());
            print_body(reply.body(), &reply.response().text());
            Ok(())
        }
        Err(err) => {
            if let Some(response) = err.response() {
                println!("{}", response.status());
                print_body(err.body(), &response.text());
            }
            Err(anyhow::Error::new(err).context("Request failed"))
        }
    }
}

fn print_body(body: Option<&Value>, raw: &str) {
    match body {
        Some(body) => match serde_json::to_string_pretty(body) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{body}"),
        },
        None if !raw.is_empty() => println!("{raw}"),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("petId=7").unwrap(),
            ("petId".to_string(), "7".to_string())
        );
        assert_eq!(
            parse_key_value("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_value("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        parse_key_value("novalue").unwrap_err();
        parse_key_value("=x").unwrap_err();
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(r#"{"name":"Rex"}"#), json!({"name": "Rex"}));
        assert_eq!(parse_body("plain text"), json!("plain text"));
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "petstore",
            "-X",
            "post",
            "/pet/{petId}",
            "-p",
            "petId=3",
            "--form",
            "name=Rex",
            "--content-type",
            "application/x-www-form-urlencoded",
        ])
        .unwrap();
        assert_eq!(args.base_path, DEFAULT_BASE_PATH);
        assert_eq!(args.path_params, [("petId".to_string(), "3".to_string())]);
        assert_eq!(args.form_params, [("name".to_string(), "Rex".to_string())]);
        assert_eq!(args.timeout, 30);
    }

    #[test(tokio::test)]
    async fn test_build_call() -> Result<()> {
        let args = Args::try_parse_from(["petstore", "-X", "delete", "pet/{petId}", "-p", "petId=3"])?;
        let call = build_call(&args).await?;
        assert_eq!(call.method(), &Method::DELETE);
        assert_eq!(call.path(), "pet/{petId}");

        let client = ApiClient::with_config(
            &ApiConfig::new_from_base_path(args.base_path.as_str()),
            ReqwestTransport::new(),
        );
        let in_flight = client.call_api(call);
        assert_eq!(in_flight.url(), "http://petstore.swagger.io/v2/pet/3");
        Ok(())
    }
}
