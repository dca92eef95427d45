#[cfg(target_os = "linux")]
use jemallocator::Jemalloc;

#[global_allocator]
#[cfg(target_os = "linux")]
static ALLOC: Jemalloc = Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info};

use freelance_analyzer::analysis::dataset_overview;
use freelance_analyzer::dispatch::Dispatcher;
use freelance_analyzer::llm::{ChatClient, DEFAULT_BASE_URL, DEFAULT_MODEL, LlmConfig};
use freelance_analyzer::processor::columnar_processor::ColumnarProcessor;
use freelance_analyzer::shell::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file with the freelancer earnings data
    #[arg(long, env = "FREELANCE_DATA", default_value = "archive/freelancer_earnings_bd.csv")]
    data: PathBuf,

    /// API key of the chat-completions service
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "DEEPSEEK_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "DEEPSEEK_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Upper bound on one language model call
    #[arg(long, env = "DEEPSEEK_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    /// Ask "QUESTION" and exit
    #[arg(short = 'c', value_name = "QUESTION", conflicts_with = "request")]
    command: Option<String>,

    /// Execute a raw request JSON without the language model and exit
    #[arg(long, value_name = "JSON")]
    request: Option<String>,

    /// Print an overview of the dataset and exit
    #[arg(long, conflicts_with_all = ["request", "command"])]
    overview: bool,

    /// Rows shown by --overview
    #[arg(long, default_value_t = 5)]
    head: usize,
}

impl Args {
    fn llm_config(&self) -> Result<LlmConfig> {
        let Some(api_key) = self.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            bail!("no API key: pass --api-key or set DEEPSEEK_API_KEY");
        };
        Ok(LlmConfig {
            api_key,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..LlmConfig::default()
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // A missing .env is fine; flags and the real environment still apply
    if let Err(e) = dotenvy::dotenv() {
        debug!("no .env loaded: {e}");
    }
    let args = Args::parse();

    if args.overview {
        let table = ColumnarProcessor::load_or_empty(&args.data);
        match dataset_overview(&table, args.head) {
            Ok(report) => print!("{report}"),
            Err(e) => println!("{e}"),
        }
        return Ok(());
    }

    if let Some(raw) = &args.request {
        let request: serde_json::Value =
            serde_json::from_str(raw).context("--request is not valid JSON")?;
        let dispatcher = Dispatcher::new(ColumnarProcessor::load_or_empty(&args.data));
        println!("{}", dispatcher.execute_json(&request));
        return Ok(());
    }

    let client = ChatClient::new(args.llm_config()?);
    info!("using model {} at {}", client.config().model, client.config().base_url);

    let table = ColumnarProcessor::load_or_empty(&args.data);
    let shell = Shell::new(Dispatcher::new(table), client);

    let stdout = io::stdout();
    if let Some(question) = &args.command {
        shell.run_once(question, stdout.lock())?;
    } else {
        shell.run(io::stdin().lock(), stdout.lock())?;
    }
    io::stdout().flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_needs_no_api_key() {
        let args = Args::try_parse_from(["freelance-analyzer", "--overview", "--head", "3"]).unwrap();
        assert!(args.overview);
        assert_eq!(args.head, 3);
        assert!(Args::try_parse_from(["freelance-analyzer", "--overview", "-c", "why?"]).is_err());
    }

    #[test]
    fn test_missing_api_key_is_a_startup_error() {
        let args = Args {
            api_key: Some("  ".into()),
            ..Args::try_parse_from(["freelance-analyzer"]).unwrap()
        };
        assert!(args.llm_config().is_err());
    }
}
