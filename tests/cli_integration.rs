//! Integration tests for the tripcrew binary
//!
//! Every test runs the real binary against an isolated tripcrew directory.
//! Planning runs talk to a throwaway HTTP server on localhost that speaks
//! just enough of the chat completions protocol.

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread;

use serde_json::Value;
use tempfile::TempDir;

fn tripcrew_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tripcrew"))
}

/// Run tripcrew with every config and data location pointed into `dir`
fn run_tripcrew(dir: &Path, args: &[&str]) -> Output {
    Command::new(tripcrew_binary())
        .current_dir(dir)
        .env("TRIPCREW_DIR", dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg-config"))
        .env("XDG_DATA_HOME", dir.join("xdg-data"))
        .env_remove("TRIPCREW_CONFIG")
        .env_remove("GROQ_API_KEY")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute tripcrew")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn write_gateway_config(dir: &Path, base_url: &str) {
    let config = format!("gateway:\n  base_url: {}\n  timeout_secs: 10\n", base_url);
    fs::write(dir.join("tripcrew.yaml"), config).unwrap();
}

/// Read one HTTP request and return its body
fn read_request(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0;
    let mut chunked = false;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            return String::new();
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name == "content-length" {
                content_length = value.parse().unwrap_or(0);
            } else if name == "transfer-encoding" && value.eq_ignore_ascii_case("chunked") {
                chunked = true;
            }
        }
    }

    let mut body = Vec::new();
    if chunked {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).unwrap();
            let size = usize::from_str_radix(size_line.trim(), 16).unwrap_or(0);
            let mut chunk = vec![0; size + 2];
            reader.read_exact(&mut chunk).unwrap();
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    } else {
        body.resize(content_length, 0);
        reader.read_exact(&mut body).unwrap();
    }
    String::from_utf8_lossy(&body).to_string()
}

fn prompt_role(body: &str) -> String {
    let request: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let prompt = request["messages"][0]["content"].as_str().unwrap_or_default();
    prompt
        .lines()
        .find_map(|l| l.strip_prefix("Role: "))
        .unwrap_or_default()
        .to_string()
}

/// Serve chat completions until the test process exits.
/// `respond` maps the request body to a status code and JSON body.
fn spawn_server<F>(respond: F) -> String
where
    F: Fn(&str) -> (u16, String) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let body = read_request(&stream);
            let (status, payload) = respond(&body);
            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                payload.len(),
                payload
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    format!("http://{}", addr)
}

/// Echo server: every role answers with "<role> plan"
fn spawn_echo_server() -> String {
    spawn_server(|body| {
        let content = format!("{} plan", prompt_role(body));
        let payload = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        });
        (200, payload.to_string())
    })
}

#[test]
fn test_agent_list_shows_default_crew() {
    let dir = TempDir::new().unwrap();

    let agents = stdout_json(&run_tripcrew(dir.path(), &["agent", "list", "-o", "json"]));
    let roles: Vec<&str> = agents
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["role"].as_str().unwrap())
        .collect();

    assert_eq!(roles, ["Flight Specialist", "Accommodation Expert", "Activity Planner"]);
    assert_eq!(agents[0]["capabilities"][0], "Search");
}

#[test]
fn test_config_show_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let config = stdout_json(&run_tripcrew(dir.path(), &["config", "show", "-o", "json"]));

    assert_eq!(config["gateway"]["base_url"], "https://api.groq.com/openai/v1");
    assert_eq!(config["gateway"]["model"], "llama3-70b-8192");
    assert_eq!(config["gateway"]["api_key_env"], "GROQ_API_KEY");
    assert_eq!(config["history"]["limit"], 3);
}

#[test]
fn test_config_set_persists() {
    let dir = TempDir::new().unwrap();

    let output = run_tripcrew(dir.path(), &["config", "set", "gateway.model", "llama-3.3-70b"]);
    assert!(output.status.success());

    let config = stdout_json(&run_tripcrew(dir.path(), &["config", "show", "-o", "json"]));
    assert_eq!(config["gateway"]["model"], "llama-3.3-70b");
}

#[test]
fn test_dry_run_needs_no_key() {
    let dir = TempDir::new().unwrap();

    let previews = stdout_json(&run_tripcrew(
        dir.path(),
        &[
            "plan", "--dry-run", "-o", "json", "--start", "2025-06-01", "--end", "2025-06-10",
        ],
    ));
    let previews = previews.as_array().unwrap();

    assert_eq!(previews.len(), 3);
    assert_eq!(previews[0]["role"], "Flight Specialist");
    let prompt = previews[0]["prompt"].as_str().unwrap();
    assert!(prompt.contains("Plan a trip from New York to Paris for 2 travelers."));
    assert!(prompt.contains("- Dates: June 01, 2025 - June 10, 2025"));
    assert!(prompt.contains("- Budget: $1500"));
}

#[test]
fn test_plan_without_key_exits_with_warning() {
    let dir = TempDir::new().unwrap();

    let output = run_tripcrew(dir.path(), &["plan", "-o", "json"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API key"), "stderr: {}", stderr);
    assert!(!dir.path().join("history.json").exists());
}

#[test]
fn test_plan_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_gateway_config(dir.path(), &spawn_echo_server());

    let output = run_tripcrew(dir.path(), &["plan", "--api-key", "test-key", "-o", "json"]);
    let plan = stdout_json(&output);

    assert_eq!(plan["Flight Specialist"], "Flight Specialist plan");
    assert_eq!(plan["Accommodation Expert"], "Accommodation Expert plan");
    assert_eq!(plan["Activity Planner"], "Activity Planner plan");

    // Declaration order survives serialization
    let text = String::from_utf8_lossy(&output.stdout);
    let flight = text.find("\"Flight Specialist\"").unwrap();
    let hotel = text.find("\"Accommodation Expert\"").unwrap();
    let activity = text.find("\"Activity Planner\"").unwrap();
    assert!(flight < hotel && hotel < activity);
}

#[test]
fn test_key_from_env_file() {
    let dir = TempDir::new().unwrap();
    write_gateway_config(dir.path(), &spawn_echo_server());
    fs::write(dir.path().join(".env"), "GROQ_API_KEY=from-dotenv\n").unwrap();

    let plan = stdout_json(&run_tripcrew(dir.path(), &["plan", "-o", "json"]));

    assert_eq!(plan["Activity Planner"], "Activity Planner plan");
}

#[test]
fn test_rejected_key_is_absorbed_per_role() {
    let dir = TempDir::new().unwrap();
    let url = spawn_server(|_| {
        (401, r#"{"error":{"message":"Invalid API Key"}}"#.to_string())
    });
    write_gateway_config(dir.path(), &url);

    let plan = stdout_json(&run_tripcrew(dir.path(), &["plan", "--api-key", "bad", "-o", "json"]));
    let entries = plan.as_object().unwrap();

    assert_eq!(entries.len(), 3);
    for (role, text) in entries {
        let text = text.as_str().unwrap();
        assert!(text.starts_with("❌ Error:"), "{}: {}", role, text);
        assert!(text.contains("Invalid API Key"), "{}: {}", role, text);
    }
}

#[test]
fn test_unreachable_endpoint_is_absorbed() {
    let dir = TempDir::new().unwrap();
    // Bind then drop so the port is very likely closed
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    write_gateway_config(dir.path(), &format!("http://127.0.0.1:{}", port));

    let plan = stdout_json(&run_tripcrew(dir.path(), &["plan", "--api-key", "k", "-o", "json"]));

    for (_, text) in plan.as_object().unwrap() {
        assert!(text.as_str().unwrap().starts_with("❌ Error:"));
    }
}

#[test]
fn test_history_keeps_three_newest() {
    let dir = TempDir::new().unwrap();
    write_gateway_config(dir.path(), &spawn_echo_server());

    for destination in ["Rome", "Lisbon", "Oslo", "Kyoto"] {
        let output = run_tripcrew(
            dir.path(),
            &["plan", "--api-key", "k", "--to", destination, "-o", "json"],
        );
        assert!(output.status.success());
    }

    let runs = stdout_json(&run_tripcrew(dir.path(), &["history", "recent", "-o", "json"]));
    let destinations: Vec<&str> = runs
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["destination"].as_str().unwrap())
        .collect();
    assert_eq!(destinations, ["Kyoto", "Oslo", "Lisbon"]);

    let newest = stdout_json(&run_tripcrew(dir.path(), &["history", "show", "1", "-o", "json"]));
    assert_eq!(newest["request"]["destination"], "Kyoto");
    assert_eq!(newest["result"]["Flight Specialist"], "Flight Specialist plan");

    let output = run_tripcrew(dir.path(), &["history", "show", "4"]);
    assert!(!output.status.success());

    let output = run_tripcrew(dir.path(), &["history", "clear"]);
    assert!(output.status.success());
    let runs = stdout_json(&run_tripcrew(dir.path(), &["history", "recent", "-o", "json"]));
    assert!(runs.as_array().unwrap().is_empty());
}

#[test]
fn test_export_writes_pdf() {
    let dir = TempDir::new().unwrap();
    write_gateway_config(dir.path(), &spawn_echo_server());
    let exports = dir.path().join("exports");

    let output = run_tripcrew(
        dir.path(),
        &[
            "plan",
            "--api-key",
            "k",
            "-o",
            "json",
            "--export",
            exports.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());

    let pdf = fs::read(exports.join("travel_plan.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(String::from_utf8_lossy(&pdf).contains("(Flight Specialist plan) Tj"));
}

#[test]
fn test_custom_crew_runs_in_file_order() {
    let dir = TempDir::new().unwrap();
    write_gateway_config(dir.path(), &spawn_echo_server());
    fs::write(
        dir.path().join("crew.yaml"),
        r#"agents:
  - role: Food Scout
    goal: Find local dishes
    backstory: Street food critic
  - role: Budget Keeper
    goal: Keep costs down
    backstory: Frugal traveler
"#,
    )
    .unwrap();

    let output = run_tripcrew(dir.path(), &["plan", "--api-key", "k", "-o", "json"]);
    let plan = stdout_json(&output);

    assert_eq!(plan.as_object().unwrap().len(), 2);
    assert_eq!(plan["Food Scout"], "Food Scout plan");
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.find("Food Scout").unwrap() < text.find("Budget Keeper").unwrap());
}

#[test]
fn test_duplicate_roles_fail_before_any_call() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("crew.yaml"),
        "agents:\n  - role: Scout\n    goal: a\n    backstory: b\n  - role: Scout\n    goal: c\n    backstory: d\n",
    )
    .unwrap();

    let output = run_tripcrew(dir.path(), &["plan", "--dry-run", "-o", "json"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Duplicate agent role"));
}

#[test]
fn test_data_uri_keeps_json_stdout_parseable() {
    let dir = TempDir::new().unwrap();
    write_gateway_config(dir.path(), &spawn_echo_server());
    let exports = dir.path().join("exports");

    let output = run_tripcrew(
        dir.path(),
        &[
            "plan",
            "--api-key",
            "k",
            "-o",
            "json",
            "--export",
            exports.to_str().unwrap(),
            "--data-uri",
        ],
    );
    let plan = stdout_json(&output);

    assert_eq!(plan["Flight Specialist"], "Flight Specialist plan");
    let stderr = String::from_utf8_lossy(&output.stderr);
    // "%PDF-1.4" in base64
    assert!(stderr.contains(r#"<a href="data:application/octet-stream;base64,JVBERi0xLjQ"#));
    assert!(stderr.contains(r#"download="travel_plan.pdf""#));
}

#[test]
fn test_data_uri_in_text_mode_goes_to_stdout() {
    let dir = TempDir::new().unwrap();
    write_gateway_config(dir.path(), &spawn_echo_server());
    let exports = dir.path().join("exports");

    let output = run_tripcrew(
        dir.path(),
        &[
            "plan",
            "--api-key",
            "k",
            "-o",
            "text",
            "--export",
            exports.to_str().unwrap(),
            "--data-uri",
        ],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout.lines().last().unwrap();
    assert!(last.starts_with(r#"<a href="data:application/octet-stream;base64,"#));
}

#[test]
fn test_history_recent_empty_in_text_mode() {
    let dir = TempDir::new().unwrap();

    let output = run_tripcrew(dir.path(), &["history", "recent", "-o", "text"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("(no history yet)"));
}
