//! # http_client
//! src/bin/http_client.rs
//!
//! Cliente de línea de comandos: un request por invocación.
//!
//! ```bash
//! http_client localhost:8080/index.html
//! http_client -X POST --json '{"username":"ana","password":"secreto"}' localhost:8080/api/register
//! http_client -X POST --form name=Ana --form city=Heredia localhost:8080/form
//! http_client -i --no-follow localhost:8080/old-page
//! ```

use clap::Parser;
use socket_http::client::{ClientConfig, HttpClient};
use socket_http::http::headers::names;
use socket_http::http::{Headers, Method, Response};
use std::io::Write;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "http_client")]
#[command(about = "Cliente HTTP/1.1 sobre sockets TCP")]
#[command(version = "0.1.0")]
struct Args {
    /// URL destino (se asume http:// si falta el esquema)
    url: String,

    /// Método HTTP
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Header adicional, formato "Nombre: valor" (repetible)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Body crudo
    #[arg(short, long, conflicts_with_all = ["json", "form"])]
    data: Option<String>,

    /// Body JSON (agrega Content-Type: application/json)
    #[arg(long, conflicts_with = "form")]
    json: Option<String>,

    /// Campo de formulario clave=valor (repetible)
    #[arg(long)]
    form: Vec<String>,

    /// Muestra la status line y los headers de la respuesta
    #[arg(short, long)]
    include: bool,

    /// No seguir redirecciones
    #[arg(long = "no-follow")]
    no_follow: bool,

    #[arg(long = "max-redirects", default_value = "10")]
    max_redirects: usize,

    /// Timeout del socket en segundos
    #[arg(long = "timeout-secs", default_value = "30")]
    timeout_secs: u64,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socket_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut client = HttpClient::with_config(ClientConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        max_redirects: args.max_redirects,
        follow_redirects: !args.no_follow,
    });

    let result = match run(&mut client, &args) {
        Ok(response) => print_response(&response, args.include),
        Err(e) => Err(e),
    };
    client.close();

    if let Err(e) = result {
        eprintln!("Request failed: {}", e);
        std::process::exit(1);
    }
}

fn run(client: &mut HttpClient, args: &Args) -> Result<Response, Box<dyn std::error::Error>> {
    let url = if args.url.starts_with("http://") || args.url.starts_with("https://") {
        args.url.clone()
    } else {
        format!("http://{}", args.url)
    };

    let method = Method::parse(&args.method);
    if method == Method::UNKNOWN {
        return Err(format!("Unsupported method: {}", args.method).into());
    }

    let mut headers = Headers::new();
    for raw in &args.headers {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| format!("Invalid header (expected 'Name: value'): {}", raw))?;
        headers.set(name.trim(), value.trim());
    }

    if !args.form.is_empty() {
        let fields = args
            .form
            .iter()
            .map(|f| f.split_once('=').unwrap_or((f.as_str(), "")))
            .collect::<Vec<_>>();
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();
        headers.set(names::CONTENT_TYPE, "application/x-www-form-urlencoded");
        return Ok(client.send(method, &url, &headers, Some(body.as_bytes()))?);
    }

    if let Some(json) = &args.json {
        headers.set(names::CONTENT_TYPE, "application/json; charset=UTF-8");
        return Ok(client.send(method, &url, &headers, Some(json.as_bytes()))?);
    }

    let body = args.data.as_ref().map(|d| d.as_bytes());
    Ok(client.send(method, &url, &headers, body)?)
}

fn print_response(response: &Response, include: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if include {
        writeln!(out, "{}", response)?;
        for (name, value) in response.headers().iter() {
            writeln!(out, "{}: {}", name, value)?;
        }
        writeln!(out)?;
    }
    if let Some(body) = response.body() {
        out.write_all(body)?;
        if !body.ends_with(b"\n") {
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
