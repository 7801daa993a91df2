use academic_flow_lib::api::{self, AppState};
use academic_flow_lib::init_logging;
use academic_flow_lib::models::{
    AssistAction, AssistRequest, Caller, DetectRequest, GenerateCitationRequest, Role,
    VerifyCitationsRequest,
};
use academic_flow_lib::services::config_store::{AppConfig, ConfigEdit, ConfigStore};
use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use tracing::{info, warn};

const USAGE: &str = "Usage:
  academicflow detect <file> [--offline] [--out <json_path>]
  academicflow verify-citations <file> [--style <name>]
  academicflow cite <text> [--style <name>]
  academicflow assist <improve|summarize|grammar> <file>
  academicflow config <set-key|clear-key|set-model|set-url> [value]

Environment:
  OPENAI_API_KEY / ACADEMICFLOW_OPENAI_API_KEY   remote model key (absent: local heuristic only)
  OPENAI_API_URL, ACADEMICFLOW_OPENAI_MODEL      endpoint and model overrides
  RUST_LOG                                       log filter (default: info)";

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn config_store() -> anyhow::Result<ConfigStore> {
    ConfigStore::default_config_dir()
        .map(ConfigStore::new)
        .ok_or_else(|| anyhow!("no config directory on this platform"))
}

fn load_config() -> AppConfig {
    let store = match config_store() {
        Ok(store) => store,
        Err(e) => {
            warn!("{}, using default config", e);
            return AppConfig::default();
        }
    };
    store.load_or_default()
}

fn edit_config(store: &ConfigStore, args: &[String]) -> anyhow::Result<()> {
    let edit = ConfigEdit::parse(&args[2], args.get(3).map(String::as_str))
        .map_err(|e| anyhow!(e))?;
    store.update(edit).map_err(|e| anyhow!(e))?;
    info!("Updated {}", store.config_file().display());
    Ok(())
}

fn read_input(path: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read file failed: {}", path))
}

fn print_json<T: Serialize>(value: &T, out_path: Option<&str>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out_path {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("write out failed: {}", path))?;
            eprintln!("Wrote JSON: {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    init_logging();

    if args[1] == "config" {
        return edit_config(&config_store()?, &args);
    }

    let mut config = load_config();
    if has_flag(&args, "--offline") {
        config.detection.use_remote = false;
    }
    let state = AppState::from_config(&config)?;
    // The CLI runs with local faculty privileges.
    let caller = Caller::new("cli", Role::Faculty);
    let style = parse_arg_value(&args, "--style").unwrap_or_else(|| "APA".to_string());

    let result = match args[1].as_str() {
        "detect" => {
            let content = read_input(&args[2])?;
            let result = api::detect_ai(&state, &caller, DetectRequest { content }).await;
            result.map(|r| print_json(&r, parse_arg_value(&args, "--out").as_deref()))
        }
        "verify-citations" => {
            let content = read_input(&args[2])?;
            let req = VerifyCitationsRequest { content, style };
            api::verify_citations(&state, &caller, req)
                .await
                .map(|r| print_json(&r, None))
        }
        "cite" => {
            let req = GenerateCitationRequest {
                input_text: args[2].clone(),
                citation_style: style,
            };
            api::generate_citation(&state, &caller, req)
                .await
                .map(|r| print_json(&r, None))
        }
        "assist" => {
            let action = AssistAction::parse(&args[2])
                .ok_or_else(|| anyhow!("unknown assist action: {}", args[2]))?;
            let path = args.get(3).ok_or_else(|| anyhow!("assist needs an input file"))?;
            let text = read_input(path)?;
            api::assist_text(&state, &caller, action, AssistRequest { text })
                .await
                .map(|r| print_json(&r, None))
        }
        other => bail!("unknown command: {}\n\n{}", other, USAGE),
    };

    match result {
        Ok(printed) => printed,
        Err(e) => bail!("{} (status {})", e, e.status_code()),
    }
}
