mod server;

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rememo_core::ast_printer::print_module;
use rememo_core::js_ast::{JsModule, ModuleItem};
use rememo_core::{analyze_function, compile_module, LogSink, MemoConfig, PassConfig};
use rememo_frontend_oxc::parse_module;

#[derive(Parser)]
#[command(name = "rememo", about = "Wrap expensive computations in useMemo")]
struct Cli {
    /// JSON file overriding the default memoization settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip a named pass (ir-blocks, direct-rewrite, imports). Repeatable.
    #[arg(long = "skip-pass", global = true)]
    skip_passes: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a JavaScript module and print the result.
    Compile {
        /// Source file to compile.
        input: PathBuf,
        /// Write the output here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the lowered IR with its analysis and reconstructed statements.
    PrintIr {
        /// Source file to inspect.
        input: PathBuf,
        /// Only print this function.
        #[arg(long)]
        function: Option<String>,
    },
    /// Serve the compiler over HTTP.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
}

fn load_config(path: Option<&Path>, skip_passes: &[String]) -> Result<MemoConfig> {
    let mut config = match path {
        Some(path) => MemoConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MemoConfig::default(),
    };
    if !skip_passes.is_empty() {
        let skip: Vec<&str> = skip_passes.iter().map(String::as_str).collect();
        config.passes = PassConfig::from_skip_list(&skip);
    }
    Ok(config)
}

fn read_module(input: &Path) -> Result<JsModule> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let filename = input.to_string_lossy();
    Ok(parse_module(&source, &filename)?)
}

fn cmd_compile(input: &Path, output: Option<&Path>, config: &MemoConfig) -> Result<()> {
    let mut module = read_module(input)?;
    let mut sink = LogSink::new();
    let stats = compile_module(&mut module, config, &mut sink)
        .with_context(|| format!("failed to compile {}", input.display()))?;
    eprintln!(
        "[compile] {} function(s), {} memo block(s), {} direct rewrite(s)",
        stats.functions, stats.memo_blocks, stats.direct_rewrites
    );

    let code = print_module(&module);
    match output {
        Some(path) => {
            fs::write(path, code).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("[compile] wrote {}", path.display());
        }
        None => print!("{code}"),
    }
    Ok(())
}

fn cmd_print_ir(input: &Path, function: Option<&str>, config: &MemoConfig) -> Result<()> {
    let module = read_module(input)?;
    let mut sink = LogSink::new();
    let mut printed = 0;
    for item in &module.items {
        let ModuleItem::Function(func) = item else {
            continue;
        };
        if function.is_some_and(|name| name != func.name) {
            continue;
        }
        let analyzed = analyze_function(func, config, &mut sink)
            .with_context(|| format!("failed to analyze `{}`", func.name))?;
        if printed > 0 {
            println!();
        }
        print!("{}", analyzed.report());
        printed += 1;
    }

    if printed == 0 {
        match function {
            Some(name) => bail!("no function named `{name}` in {}", input.display()),
            None => eprintln!("[print-ir] no function declarations in {}", input.display()),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Sink lines are mirrored to tracing under the `rememo` target, so this
    // subscriber is also how compile diagnostics reach stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rememo=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), &cli.skip_passes)?;
    match &cli.command {
        Command::Compile { input, output } => cmd_compile(input, output.as_deref(), &config),
        Command::PrintIr { input, function } => {
            cmd_print_ir(input, function.as_deref(), &config)
        }
        Command::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(server::serve(*bind, config))
        }
    }
}
