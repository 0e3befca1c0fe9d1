//! Pitusya Compiler Driver
//!
//! Reads a JSON-encoded program produced by the parser, lowers it item by
//! item, finalizes the module and either runs `main` or prints the IR.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use pitusya_common::{CompilerError, ErrorReporter};
use pitusya_ir::{CodeGenerator, Evaluator, Generated, Module, Program, Session, SessionOptions, TargetMachine, MAIN_FUNCTION};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

/// Exit status after a fatal code generation error
const FATAL_EXIT_CODE: i32 = 18;

#[derive(Parser)]
#[command(name = "pitusya")]
#[command(about = "Pitusya Compiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable logging (RUST_LOG also works)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a program, evaluate its top-level expressions and run main
    Run {
        #[command(flatten)]
        build: BuildArgs,
    },

    /// Compile a program and emit the finalized IR
    Ir {
        #[command(flatten)]
        build: BuildArgs,

        /// Write the module as JSON to this file
        #[arg(long)]
        dump_json: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Input program (JSON-encoded AST)
    input: PathBuf,

    /// Print IR to stdout after finalization
    #[arg(long)]
    print_ir: bool,

    /// Save IR to file with .ll extension
    #[arg(long)]
    save_ir: bool,

    /// Specify output path for IR file (used with --save-ir)
    #[arg(long)]
    ir_output: Option<PathBuf>,

    /// Skip the optimization passes at finalization
    #[arg(long)]
    no_opt: bool,

    /// Verify only once after all passes instead of after each one
    #[arg(long)]
    no_verify_each: bool,

    /// Name of the generated module
    #[arg(long, default_value = pitusya_ir::ir::DEFAULT_MODULE_NAME)]
    module_name: String,

    /// Target triple, defaults to the host
    #[arg(long)]
    target: Option<String>,
}

impl BuildArgs {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            module_name: self.module_name.clone(),
            verify_each: !self.no_verify_each,
            optimize: !self.no_opt,
        }
    }
}

/// Result of compiling a whole program
struct Compiled {
    module: Module,
    reporter: ErrorReporter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose || std::env::var_os("RUST_LOG").is_some() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    }

    match cli.command {
        Commands::Run { build } => {
            let compiled = compile(&build, true)?;
            emit_ir(&build, &compiled.module)?;
            let status = run_main(&compiled.module);
            process::exit(status);
        }
        Commands::Ir { build, dump_json } => {
            let compiled = compile(&build, false)?;
            emit_ir(&build, &compiled.module)?;
            if !build.print_ir && !build.save_ir {
                print!("{}", compiled.module);
            }
            if let Some(path) = dump_json {
                let json = serde_json::to_string_pretty(&compiled.module)?;
                fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                println!("Module JSON saved to: {}", path.display());
            }
            if compiled.reporter.has_errors() {
                process::exit(1);
            }
        }
    }

    Ok(())
}

/// Lower every item of the input program and close the session.
///
/// Construction errors are reported and lowering moves on to the next
/// item. Fatal errors end the process with [`FATAL_EXIT_CODE`].
fn compile(build: &BuildArgs, evaluate: bool) -> Result<Compiled> {
    let source = fs::read_to_string(&build.input)
        .with_context(|| format!("reading {}", build.input.display()))?;
    let program = Program::from_json(&source)
        .with_context(|| format!("parsing {}", build.input.display()))?;
    info!("Loaded {} item(s) from {}", program.items.len(), build.input.display());

    let options = build.session_options();
    let session = match &build.target {
        Some(triple) => TargetMachine::from_triple(triple).map(|target| Session::with_target(options, target)),
        None => Session::new(options),
    };
    let mut reporter = ErrorReporter::new();
    let session = session.unwrap_or_else(|err| abort(&mut reporter, &err));

    let mut generator = CodeGenerator::new(session);
    if let Err(err) = generator.declare_runtime_library() {
        abort(&mut reporter, &err);
    }

    for item in &program.items {
        match generator.generate_item(item) {
            Ok(Generated::TopLevel(wrapper)) if evaluate => {
                match generator.evaluate(wrapper, io::stdout()) {
                    Ok(value) => debug!("Top-level expression evaluated to {value}"),
                    Err(err) => {
                        reporter.report(&err);
                    }
                }
            }
            Ok(generated) => debug!("Lowered {generated:?}"),
            Err(err) if err.is_fatal() => abort(&mut reporter, &err),
            Err(err) => {
                reporter.report(&err);
            }
        }
    }

    let module = generator.finish().unwrap_or_else(|err| abort(&mut reporter, &err));
    if reporter.has_errors() {
        reporter.print_diagnostics();
        eprintln!("{}", reporter.summary());
    }
    Ok(Compiled { module, reporter })
}

fn emit_ir(build: &BuildArgs, module: &Module) -> Result<()> {
    if build.print_ir {
        println!("\n=== IR Output ===");
        print!("{module}");
        println!("=== End IR ===\n");
    }

    if build.save_ir {
        let ir_path = ir_path(&build.input, build.ir_output.as_deref());
        fs::write(&ir_path, module.to_string())
            .with_context(|| format!("writing {}", ir_path.display()))?;
        println!("IR saved to: {}", ir_path.display());
    }
    Ok(())
}

/// The explicit output path, or the input path with a `.ll` extension
fn ir_path(input: &Path, ir_output: Option<&Path>) -> PathBuf {
    match ir_output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension("ll"),
    }
}

/// Call `main` and turn its result into the process exit status
fn run_main(module: &Module) -> i32 {
    if module.get_function(MAIN_FUNCTION).is_none() {
        eprintln!("No main function. Consider creating it.");
        return FATAL_EXIT_CODE;
    }

    match Evaluator::new(module).call(MAIN_FUNCTION, &[]) {
        Ok(result) => result as i32,
        Err(err) => {
            let mut reporter = ErrorReporter::new();
            reporter.report(&err);
            reporter.print_diagnostics();
            FATAL_EXIT_CODE
        }
    }
}

fn abort(reporter: &mut ErrorReporter, err: &CompilerError) -> ! {
    reporter.report(err);
    reporter.print_diagnostics();
    eprintln!("{}", reporter.summary());
    process::exit(FATAL_EXIT_CODE);
}
