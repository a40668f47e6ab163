use chrono::{Datelike, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const DURATION_SECS: u64 = 20;
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

struct Target {
    name: &'static str,
    method: &'static str,
    url: String,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
}

#[tokio::main]
async fn main() {
    let base_url = env::var("BENCH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let username = env::var("BENCH_USERNAME").or_else(|_| env::var("ADMIN_USERNAME")).unwrap_or_else(|_| "owner".to_string());
    let password = env::var("BENCH_PASSWORD").or_else(|_| env::var("ADMIN_PASSWORD")).unwrap_or_default();

    println!("{}", "🚀 Starting Benchmark Suite".bold().green());
    println!("Target URL: {}", base_url);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .cookie_store(true)
        .build()
        .unwrap();

    if client.get(format!("{}/health", base_url)).send().await.is_err() {
        eprintln!("{}", format!("❌ Server is NOT reachable at {}. Please start it first.", base_url).red().bold());
        return;
    }

    println!("\n{}", "⚙️  Logging in...".yellow());
    login(&client, &base_url, &username, &password).await;
    let apartment = pick_apartment(&client, &base_url).await;

    let today = Utc::now().date_naive();
    let (year, month) = (today.year(), today.month());

    println!("{}", "✅ Session ready.".green());
    println!("   Apartment: {}", apartment);
    println!("   Month:     {}-{:02}", year, month);

    let month_query = vec![
        ("apartment", apartment.clone()),
        ("year", year.to_string()),
        ("month", month.to_string()),
    ];

    let targets = vec![
        Target {
            name: "Health Check (Public)",
            method: "GET",
            url: format!("{}/health", base_url),
            query: Vec::new(),
            body: None,
        },
        Target {
            name: "Calendar Grid (JSON)",
            method: "GET",
            url: format!("{}/api/v1/calendar", base_url),
            query: month_query.clone(),
            body: None,
        },
        Target {
            name: "Printable Calendar (HTML)",
            method: "GET",
            url: format!("{}/api/v1/calendar/print", base_url),
            query: month_query,
            body: None,
        },
        Target {
            name: "Month Export (ZIP)",
            method: "GET",
            url: format!("{}/api/v1/calendar/export", base_url),
            query: vec![("year", year.to_string()), ("month", month.to_string())],
            body: None,
        },
        Target {
            name: "Login Flow (Crypto Intensive)",
            method: "POST",
            url: format!("{}/api/v1/auth/login", base_url),
            query: Vec::new(),
            body: Some(json!({ "username": username, "password": password })),
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {} {:?}", target.url, target.query);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }
}

async fn login(client: &Client, base_url: &str, username: &str, password: &str) {
    let res = client.post(format!("{}/api/v1/auth/login", base_url))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Login failed during setup");

    if !res.status().is_success() {
        panic!("Login failed. Status: {}. Set BENCH_USERNAME/BENCH_PASSWORD.", res.status());
    }
}

async fn pick_apartment(client: &Client, base_url: &str) -> String {
    if let Ok(name) = env::var("BENCH_APARTMENT") {
        return name;
    }

    let res = client.get(format!("{}/api/v1/apartments", base_url))
        .send()
        .await
        .expect("Failed to list apartments");

    let apartments: Value = res.json().await.expect("Failed to parse apartments response");
    apartments.as_array()
        .and_then(|list| list.first())
        .and_then(|a| a["name"].as_str())
        .map(str::to_string)
        .expect("No apartments configured. Set PROPERTIES_JSON on the server or BENCH_APARTMENT.")
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let query = target.query.clone();
            let body = target.body.clone();
            let method = target.method;
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = match method {
                    "POST" => {
                        let mut req = client.post(&url);
                        if let Some(b) = body {
                            req = req.json(&b);
                        }
                        req.send().await
                    },
                    _ => client.get(&url).query(&query).send().await,
                };

                let success = match res {
                    Ok(r) => {
                        let ok = r.status().is_success();
                        let _ = r.bytes().await;
                        ok
                    }
                    Err(_) => false,
                };
                let latency = req_start.elapsed();

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
